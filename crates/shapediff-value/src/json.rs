//! Decoding JSON documents into values.
//!
//! Objects become `Map<String, dyn>`, arrays `Vec<dyn>`, and every nested
//! member is wrapped in an interface slot, the shape a dynamically typed
//! decoder produces. A top-level `null` decodes to [`Value::Nil`].

use serde_json::Value as Json;

use crate::error::ValueResult;
use crate::types::{FloatWidth, IntWidth, Type};
use crate::value::Value;

fn member(json: Json) -> Value {
    match json {
        Json::Null => Value::nil_interface(),
        other => Value::interface(scalar_or_container(other)),
    }
}

fn scalar_or_container(json: Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(IntWidth::W64, i)
            } else if let Some(u) = n.as_u64() {
                Value::Uint(IntWidth::W64, u)
            } else {
                Value::Float(FloatWidth::W64, n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::String(s),
        Json::Array(items) => {
            Value::slice(Type::Interface, items.into_iter().map(member).collect())
        }
        Json::Object(fields) => Value::map(
            Type::String,
            Type::Interface,
            fields.into_iter().map(|(k, v)| (Value::String(k), member(v))),
        ),
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        scalar_or_container(json)
    }
}

impl Value {
    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> ValueResult<Self> {
        let json: Json = serde_json::from_str(s)?;
        Ok(json.into())
    }

    /// Parse a JSON document from bytes.
    pub fn from_json_slice(bytes: &[u8]) -> ValueResult<Self> {
        let json: Json = serde_json::from_slice(bytes)?;
        Ok(json.into())
    }
}
