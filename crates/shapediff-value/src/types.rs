//! Dynamic type descriptors.
//!
//! Every valid, non-nil [`Value`](crate::Value) has a [`Type`]. Type equality
//! is structural for composite types and nominal for structs: two struct
//! types are the same type when they carry the same name.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Bit width of an integer type. `Size` is the platform word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    Size,
}

impl IntWidth {
    fn suffix(self) -> &'static str {
        match self {
            Self::W8 => "8",
            Self::W16 => "16",
            Self::W32 => "32",
            Self::W64 => "64",
            Self::Size => "size",
        }
    }
}

/// Bit width of a floating point component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatWidth {
    W32,
    W64,
}

/// Coarse classification of a [`Type`], ignoring widths and element types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Complex,
    String,
    UnsafePointer,
    Chan,
    Func,
    Interface,
    Ptr,
    Array,
    Slice,
    Map,
    Struct,
}

/// The dynamic type of a value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    Int(IntWidth),
    Uint(IntWidth),
    Float(FloatWidth),
    Complex(FloatWidth),
    String,
    UnsafePointer,
    /// Channel carrying values of the element type.
    Chan(Arc<Type>),
    /// Function with the given signature text, e.g. `(i64) -> bool`.
    Func(Arc<str>),
    /// A slot able to hold a value of any type.
    Interface,
    Ptr(Arc<Type>),
    Array(Arc<Type>, usize),
    Slice(Arc<Type>),
    Map(Arc<Type>, Arc<Type>),
    /// Named record type.
    Struct(Arc<str>),
}

impl Type {
    pub fn ptr(elem: Type) -> Self {
        Self::Ptr(Arc::new(elem))
    }

    pub fn slice(elem: Type) -> Self {
        Self::Slice(Arc::new(elem))
    }

    pub fn array(elem: Type, len: usize) -> Self {
        Self::Array(Arc::new(elem), len)
    }

    pub fn map(key: Type, value: Type) -> Self {
        Self::Map(Arc::new(key), Arc::new(value))
    }

    pub fn chan(elem: Type) -> Self {
        Self::Chan(Arc::new(elem))
    }

    pub fn func(signature: &str) -> Self {
        Self::Func(Arc::from(signature))
    }

    pub fn named(name: &str) -> Self {
        Self::Struct(Arc::from(name))
    }

    /// The coarse kind of this type.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Uint(_) => Kind::Uint,
            Self::Float(_) => Kind::Float,
            Self::Complex(_) => Kind::Complex,
            Self::String => Kind::String,
            Self::UnsafePointer => Kind::UnsafePointer,
            Self::Chan(_) => Kind::Chan,
            Self::Func(_) => Kind::Func,
            Self::Interface => Kind::Interface,
            Self::Ptr(_) => Kind::Ptr,
            Self::Array(..) => Kind::Array,
            Self::Slice(_) => Kind::Slice,
            Self::Map(..) => Kind::Map,
            Self::Struct(_) => Kind::Struct,
        }
    }

    /// Whether values of this type support raw equality.
    ///
    /// Slices, maps and functions are never comparable; arrays are
    /// comparable when their element type is. Struct comparability depends
    /// on the field values and is decided per value.
    pub fn is_comparable(&self) -> bool {
        match self {
            Self::Func(_) | Self::Slice(_) | Self::Map(..) => false,
            Self::Array(elem, _) => elem.is_comparable(),
            _ => true,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int(w) => write!(f, "i{}", w.suffix()),
            Self::Uint(w) => write!(f, "u{}", w.suffix()),
            Self::Float(FloatWidth::W32) => f.write_str("f32"),
            Self::Float(FloatWidth::W64) => f.write_str("f64"),
            Self::Complex(FloatWidth::W32) => f.write_str("complex64"),
            Self::Complex(FloatWidth::W64) => f.write_str("complex128"),
            Self::String => f.write_str("String"),
            Self::UnsafePointer => f.write_str("*const ()"),
            Self::Chan(elem) => write!(f, "Chan<{elem}>"),
            Self::Func(sig) => write!(f, "fn{sig}"),
            Self::Interface => f.write_str("dyn"),
            Self::Ptr(elem) => write!(f, "&{elem}"),
            Self::Array(elem, len) => write!(f, "[{elem}; {len}]"),
            Self::Slice(elem) => write!(f, "Vec<{elem}>"),
            Self::Map(key, value) => write!(f, "Map<{key}, {value}>"),
            Self::Struct(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struct_types_are_nominal() {
        assert_eq!(Type::named("Sample"), Type::named("Sample"));
        assert_ne!(Type::named("Sample"), Type::named("Other"));
    }

    #[test]
    fn array_length_is_part_of_the_type() {
        assert_ne!(
            Type::array(Type::String, 3),
            Type::array(Type::String, 2)
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(Type::Int(IntWidth::W64).to_string(), "i64");
        assert_eq!(Type::Uint(IntWidth::Size).to_string(), "usize");
        assert_eq!(Type::slice(Type::String).to_string(), "Vec<String>");
        assert_eq!(
            Type::map(Type::String, Type::Interface).to_string(),
            "Map<String, dyn>"
        );
        assert_eq!(Type::ptr(Type::named("Node")).to_string(), "&Node");
        assert_eq!(Type::func("(i64) -> bool").to_string(), "fn(i64) -> bool");
    }

    #[test]
    fn comparability() {
        assert!(Type::named("Key").is_comparable());
        assert!(Type::array(Type::Bool, 2).is_comparable());
        assert!(!Type::array(Type::slice(Type::Bool), 2).is_comparable());
        assert!(!Type::map(Type::String, Type::Bool).is_comparable());
        assert!(!Type::func("()").is_comparable());
    }
}
