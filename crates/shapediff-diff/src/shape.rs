//! Structural classification of values.
//!
//! Both engines dispatch on [`Shape`] rather than on concrete types. The
//! tolerant engine compares values of different types that share a shape;
//! the strict engine only reaches the shape dispatch once types are equal.

use shapediff_value::{Kind, Type, Value};

/// The structural family of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// No value.
    Invalid,
    /// The untyped nil.
    Nil,
    /// Booleans, numbers, strings, raw pointers and channels.
    Scalar,
    /// Arrays and slices.
    Indexed,
    /// Structs and maps keyed by `String`.
    Fielded,
    /// Maps with any other key type.
    Associative,
    /// Pointers and interface slots.
    Pointer,
    Function,
}

impl Shape {
    pub fn of(v: &Value) -> Self {
        match v {
            Value::Invalid => Self::Invalid,
            Value::Nil => Self::Nil,
            Value::Array(_) | Value::Slice(_) => Self::Indexed,
            Value::Struct(_) => Self::Fielded,
            Value::Map(m) if *m.key_type() == Type::String => Self::Fielded,
            Value::Map(_) => Self::Associative,
            Value::Ptr(_) | Value::Interface(_) => Self::Pointer,
            Value::Func(_) => Self::Function,
            Value::Bool(_)
            | Value::Int(..)
            | Value::Uint(..)
            | Value::Float(..)
            | Value::Complex(..)
            | Value::String(_)
            | Value::UnsafePointer(_)
            | Value::Chan(_) => Self::Scalar,
        }
    }
}

/// Equivalence classes for scalar comparison across widths.
///
/// All signed integers form one class, as do unsigned integers, floats and
/// complex numbers. Values in different classes never compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScalarClass {
    Bool,
    Int,
    Uint,
    Float,
    Complex,
    String,
    UnsafePointer,
    Chan,
}

impl ScalarClass {
    /// The class of a non-nil scalar, or `None` for anything else.
    pub(crate) fn of(v: &Value) -> Option<Self> {
        if v.is_nil() {
            return None;
        }
        Some(match v.kind()? {
            Kind::Bool => Self::Bool,
            Kind::Int => Self::Int,
            Kind::Uint => Self::Uint,
            Kind::Float => Self::Float,
            Kind::Complex => Self::Complex,
            Kind::String => Self::String,
            Kind::UnsafePointer => Self::UnsafePointer,
            Kind::Chan => Self::Chan,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapediff_value::IntWidth;

    #[test]
    fn string_keyed_maps_are_fielded() {
        let fielded = Value::map(Type::String, Type::Bool, vec![]);
        let assoc = Value::map(Type::Int(IntWidth::W64), Type::Bool, vec![]);
        assert_eq!(Shape::of(&fielded), Shape::Fielded);
        assert_eq!(Shape::of(&assoc), Shape::Associative);
        assert_eq!(Shape::of(&Value::record::<&str>("Empty", vec![])), Shape::Fielded);
    }

    #[test]
    fn classification() {
        assert_eq!(Shape::of(&Value::Nil), Shape::Nil);
        assert_eq!(Shape::of(&Value::Invalid), Shape::Invalid);
        assert_eq!(Shape::of(&Value::from(1u8)), Shape::Scalar);
        assert_eq!(Shape::of(&Value::chan(Type::Bool)), Shape::Scalar);
        assert_eq!(Shape::of(&Value::nil_slice(Type::Bool)), Shape::Indexed);
        assert_eq!(Shape::of(&Value::nil_interface()), Shape::Pointer);
        assert_eq!(Shape::of(&Value::nil_func("fn()")), Shape::Function);
    }

    #[test]
    fn scalar_classes_ignore_width() {
        assert_eq!(ScalarClass::of(&Value::from(1i8)), ScalarClass::of(&Value::from(1i64)));
        assert_ne!(ScalarClass::of(&Value::from(1i8)), ScalarClass::of(&Value::from(1u8)));
        assert_eq!(ScalarClass::of(&Value::nil_chan(Type::Bool)), None);
        assert_eq!(ScalarClass::of(&Value::slice(Type::Bool, vec![])), None);
    }
}
