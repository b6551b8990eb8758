//! Hashable comparison keys.
//!
//! A [`Key`] is the canonical, hashable form of a comparable value. Map
//! entries are indexed by key and unordered sequence comparison counts keys.
//! Reference-like values (pointers, channels) contribute their address, so
//! computing a key never follows a shared cell and always terminates.

use std::sync::Arc;

use crate::types::Type;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    /// IEEE bits, with negative zero folded into positive zero.
    Float(u64),
    Complex(u64, u64),
    String(String),
    Addr(usize),
    Array(Vec<Key>),
    Struct(Arc<str>, Vec<Key>),
    Interface(Option<(Type, Box<Key>)>),
}

fn float_bits(v: f64) -> u64 {
    if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

impl Value {
    /// The comparison key of this value, or `None` when the value is not
    /// comparable (slices, maps, functions, or composites holding one).
    ///
    /// Integer widths are folded together: `1i8` and `1i64` share a key.
    pub fn comparable_key(&self) -> Option<Key> {
        match self {
            Value::Invalid => None,
            Value::Nil => Some(Key::Nil),
            Value::Bool(b) => Some(Key::Bool(*b)),
            Value::Int(_, v) => Some(Key::Int(*v)),
            Value::Uint(_, v) => Some(Key::Uint(*v)),
            Value::Float(_, v) => Some(Key::Float(float_bits(*v))),
            Value::Complex(_, c) => Some(Key::Complex(float_bits(c.re), float_bits(c.im))),
            Value::String(s) => Some(Key::String(s.clone())),
            Value::UnsafePointer(addr) => Some(Key::Addr(*addr)),
            Value::Chan(c) => Some(Key::Addr(c.addr().unwrap_or(0))),
            Value::Ptr(p) => Some(Key::Addr(p.addr().unwrap_or(0))),
            Value::Func(_) | Value::Slice(_) | Value::Map(_) => None,
            Value::Array(a) => a
                .items()
                .iter()
                .map(Value::comparable_key)
                .collect::<Option<Vec<_>>>()
                .map(Key::Array),
            Value::Struct(s) => s
                .fields()
                .iter()
                .map(|(_, v)| v.comparable_key())
                .collect::<Option<Vec<_>>>()
                .map(|keys| Key::Struct(s.name_arc(), keys)),
            Value::Interface(None) => Some(Key::Interface(None)),
            Value::Interface(Some(inner)) => match inner.ty() {
                Some(ty) => inner
                    .comparable_key()
                    .map(|k| Key::Interface(Some((ty, Box::new(k))))),
                None => Some(Key::Interface(None)),
            },
        }
    }

    /// Whether [`Value::comparable_key`] yields a key.
    pub fn is_comparable(&self) -> bool {
        self.comparable_key().is_some()
    }
}
