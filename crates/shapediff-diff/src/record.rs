//! Diff records: where two values disagree and why.
//!
//! A [`Diff`] pairs a path (the chain of field, key, index and indirection
//! segments leading from the compared roots to the disagreement) with a
//! [`Cause`]. Causes render exactly as the assertion messages built on top
//! of them expect, so the `Display` strings are part of the contract.

use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use shapediff_value::Value;
use thiserror::Error;

/// Path segment for one pointer indirection.
pub const DEREF_SEGMENT: &str = "[&]";

/// Path segment for one interface indirection.
pub const DYN_SEGMENT: &str = "[dyn]";

/// Path segment for a named field or a map key.
pub fn field_segment(name: impl fmt::Display) -> String {
    format!("[{name}]")
}

/// Path segment for a sequence index.
pub fn index_segment(index: usize) -> String {
    format!("[{index}]")
}

fn type_label(v: &Value) -> String {
    v.ty()
        .map_or_else(|| "<nil>".to_string(), |t| t.to_string())
}

/// Why two values at the same path disagree.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Cause {
    /// Same kind, different contents. Also used when exactly one side is nil.
    #[error("values diff\nA={a}\nB={b}")]
    Value { a: Value, b: Value },

    /// The dynamic types (strict) or shapes (tolerant) differ.
    #[error("value types diff\nType of A={}\nType of B={}", type_label(.a), type_label(.b))]
    Type { a: Value, b: Value },

    /// Two non-nil functions. Functions have no meaningful equality.
    #[error("functions cannot be compared")]
    Func { a: Value, b: Value },

    /// Sequences or maps of different lengths. `delta` is `len(a) - len(b)`.
    #[error("value length diff = {delta}")]
    Length { a: Value, b: Value, delta: i64 },

    /// A key or field present on one side only. `on_a` and `on_b` name the
    /// side that has it.
    #[error("key [{key}] not found")]
    KeyMissing { key: String, on_a: bool, on_b: bool },

    /// At least one side holds no value at all.
    #[error("invalid value")]
    Invalid { valid_a: bool, valid_b: bool },
}

impl Cause {
    /// Stable snake_case name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value { .. } => "value",
            Self::Type { .. } => "type",
            Self::Func { .. } => "func",
            Self::Length { .. } => "length",
            Self::KeyMissing { .. } => "key_missing",
            Self::Invalid { .. } => "invalid",
        }
    }

    pub(crate) fn values(a: &Value, b: &Value) -> Self {
        Self::Value {
            a: a.clone(),
            b: b.clone(),
        }
    }

    pub(crate) fn types(a: &Value, b: &Value) -> Self {
        Self::Type {
            a: a.clone(),
            b: b.clone(),
        }
    }

    pub(crate) fn funcs(a: &Value, b: &Value) -> Self {
        Self::Func {
            a: a.clone(),
            b: b.clone(),
        }
    }

    pub(crate) fn lengths(a: &Value, b: &Value, len_a: usize, len_b: usize) -> Self {
        Self::Length {
            a: a.clone(),
            b: b.clone(),
            delta: len_a as i64 - len_b as i64,
        }
    }

    pub(crate) fn only_on_a(key: impl fmt::Display) -> Self {
        Self::KeyMissing {
            key: key.to_string(),
            on_a: true,
            on_b: false,
        }
    }

    pub(crate) fn only_on_b(key: impl fmt::Display) -> Self {
        Self::KeyMissing {
            key: key.to_string(),
            on_a: false,
            on_b: true,
        }
    }
}

/// One disagreement between two compared values.
#[derive(Clone, Debug, PartialEq)]
pub struct Diff {
    /// Segments from the roots to the disagreement. Empty at the root.
    pub path: Vec<String>,
    pub cause: Cause,
}

impl Diff {
    pub fn new(path: Vec<String>, cause: Cause) -> Self {
        Self { path, cause }
    }

    /// The path segments joined by single spaces.
    pub fn path_string(&self) -> String {
        self.path.join(" ")
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path [{}] : {}", self.path_string(), self.cause)
    }
}

impl Serialize for Diff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Diff", 3)?;
        s.serialize_field("path", &self.path)?;
        s.serialize_field("kind", self.cause.kind())?;
        s.serialize_field("message", &self.cause.to_string())?;
        s.end()
    }
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Working path plus the diffs collected so far during one traversal.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    path: Vec<String>,
    diffs: Vec<Diff>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a diff at the current path.
    pub(crate) fn report(&mut self, cause: Cause) {
        self.diffs.push(Diff::new(self.path.clone(), cause));
    }

    /// Record a diff one segment below the current path.
    pub(crate) fn report_at(&mut self, segment: String, cause: Cause) {
        self.enter(segment);
        self.report(cause);
        self.leave();
    }

    pub(crate) fn enter(&mut self, segment: String) {
        self.path.push(segment);
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }

    pub(crate) fn finish(self) -> Vec<Diff> {
        self.diffs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapediff_value::Type;

    #[test]
    fn cause_renderings() {
        let a = Value::from(12.0f64);
        let b = Value::from(13.0f64);
        assert_eq!(Cause::values(&a, &b).to_string(), "values diff\nA=12\nB=13");

        let t = Cause::types(&Value::from("x"), &Value::from(1i64));
        assert_eq!(t.to_string(), "value types diff\nType of A=String\nType of B=i64");

        let n = Cause::types(&Value::Nil, &Value::from(true));
        assert_eq!(n.to_string(), "value types diff\nType of A=<nil>\nType of B=bool");

        let f = Value::func("fn()");
        assert_eq!(Cause::funcs(&f, &f).to_string(), "functions cannot be compared");

        let s = Value::slice(Type::Bool, vec![]);
        assert_eq!(Cause::lengths(&s, &s, 2, 5).to_string(), "value length diff = -3");

        assert_eq!(Cause::only_on_a("c").to_string(), "key [c] not found");
        let invalid = Cause::Invalid {
            valid_a: false,
            valid_b: true,
        };
        assert_eq!(invalid.to_string(), "invalid value");
    }

    #[test]
    fn diff_display_joins_path() {
        let diff = Diff::new(
            vec!["[c]".into(), "[0]".into()],
            Cause::only_on_b("k"),
        );
        assert_eq!(diff.to_string(), "Path [[c] [0]] : key [k] not found");
        assert_eq!(
            Diff::new(vec![], Cause::only_on_b("k")).to_string(),
            "Path [] : key [k] not found"
        );
    }

    #[test]
    fn diff_serializes_kind_and_message() {
        let diff = Diff::new(vec![index_segment(2)], Cause::only_on_a("x"));
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "path": ["[2]"],
                "kind": "key_missing",
                "message": "key [x] not found"
            })
        );
    }

    #[test]
    fn recorder_snapshots_paths() {
        let mut rec = Recorder::new();
        rec.enter(field_segment("a"));
        rec.report_at(index_segment(1), Cause::only_on_a("k"));
        rec.leave();
        rec.report(Cause::only_on_b("j"));

        let diffs = rec.finish();
        assert_eq!(diffs[0].path, ["[a]", "[1]"]);
        assert!(diffs[1].path.is_empty());
    }
}
