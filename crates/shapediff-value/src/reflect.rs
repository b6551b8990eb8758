//! Conversion of Rust values into [`Value`]s.
//!
//! [`Reflect`] is the bridge between statically typed Rust data and the
//! dynamic value graph. It is implemented for primitives, strings, the
//! standard collections, `Option`/`Box` (as nullable pointers) and
//! [`Value`] itself (as an interface slot). User structs opt in with
//! [`reflect_struct!`](crate::reflect_struct).

use std::collections::{BTreeMap, HashMap};

use crate::types::{FloatWidth, IntWidth, Type};
use crate::value::{Complex, Value};

/// Types that can be viewed as a dynamic [`Value`].
pub trait Reflect {
    /// The static type of every value produced by [`Reflect::reflect`].
    fn reflect_type() -> Type
    where
        Self: Sized;

    fn reflect(&self) -> Value;
}

macro_rules! reflect_scalar {
    ($($t:ty => $ty:expr, |$v:ident| $value:expr;)*) => {
        $(
            impl Reflect for $t {
                fn reflect_type() -> Type {
                    $ty
                }

                fn reflect(&self) -> Value {
                    let $v = *self;
                    $value
                }
            }

            impl From<$t> for Value {
                fn from($v: $t) -> Self {
                    $value
                }
            }
        )*
    };
}

reflect_scalar! {
    bool => Type::Bool, |v| Value::Bool(v);
    i8 => Type::Int(IntWidth::W8), |v| Value::Int(IntWidth::W8, i64::from(v));
    i16 => Type::Int(IntWidth::W16), |v| Value::Int(IntWidth::W16, i64::from(v));
    i32 => Type::Int(IntWidth::W32), |v| Value::Int(IntWidth::W32, i64::from(v));
    i64 => Type::Int(IntWidth::W64), |v| Value::Int(IntWidth::W64, v);
    isize => Type::Int(IntWidth::Size), |v| Value::Int(IntWidth::Size, v as i64);
    u8 => Type::Uint(IntWidth::W8), |v| Value::Uint(IntWidth::W8, u64::from(v));
    u16 => Type::Uint(IntWidth::W16), |v| Value::Uint(IntWidth::W16, u64::from(v));
    u32 => Type::Uint(IntWidth::W32), |v| Value::Uint(IntWidth::W32, u64::from(v));
    u64 => Type::Uint(IntWidth::W64), |v| Value::Uint(IntWidth::W64, v);
    usize => Type::Uint(IntWidth::Size), |v| Value::Uint(IntWidth::Size, v as u64);
    f32 => Type::Float(FloatWidth::W32), |v| Value::Float(FloatWidth::W32, f64::from(v));
    f64 => Type::Float(FloatWidth::W64), |v| Value::Float(FloatWidth::W64, v);
    Complex => Type::Complex(FloatWidth::W64), |v| Value::Complex(FloatWidth::W64, v);
}

impl Reflect for String {
    fn reflect_type() -> Type {
        Type::String
    }

    fn reflect(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Reflect for &str {
    fn reflect_type() -> Type {
        Type::String
    }

    fn reflect(&self) -> Value {
        Value::String((*self).to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// A `Value` reflects as an interface slot holding it.
impl Reflect for Value {
    fn reflect_type() -> Type {
        Type::Interface
    }

    fn reflect(&self) -> Value {
        match self {
            Value::Nil => Value::nil_interface(),
            Value::Interface(_) => self.clone(),
            other => Value::interface(other.clone()),
        }
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect_type() -> Type {
        Type::slice(T::reflect_type())
    }

    fn reflect(&self) -> Value {
        Value::slice(T::reflect_type(), self.iter().map(Reflect::reflect).collect())
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect_type() -> Type {
        Type::array(T::reflect_type(), N)
    }

    fn reflect(&self) -> Value {
        Value::array(T::reflect_type(), self.iter().map(Reflect::reflect).collect())
    }
}

/// `None` is a nil pointer, `Some` a pointer to a fresh cell.
impl<T: Reflect> Reflect for Option<T> {
    fn reflect_type() -> Type {
        Type::ptr(T::reflect_type())
    }

    fn reflect(&self) -> Value {
        match self {
            Some(v) => Value::pointer_to(T::reflect_type(), v.reflect()),
            None => Value::nil_pointer(T::reflect_type()),
        }
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn reflect_type() -> Type {
        Type::ptr(T::reflect_type())
    }

    fn reflect(&self) -> Value {
        Value::pointer_to(T::reflect_type(), self.as_ref().reflect())
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn reflect_type() -> Type {
        Type::map(K::reflect_type(), V::reflect_type())
    }

    fn reflect(&self) -> Value {
        Value::map(
            K::reflect_type(),
            V::reflect_type(),
            self.iter().map(|(k, v)| (k.reflect(), v.reflect())),
        )
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn reflect_type() -> Type {
        Type::map(K::reflect_type(), V::reflect_type())
    }

    fn reflect(&self) -> Value {
        Value::map(
            K::reflect_type(),
            V::reflect_type(),
            self.iter().map(|(k, v)| (k.reflect(), v.reflect())),
        )
    }
}

impl Value {
    /// Reflect any [`Reflect`] value.
    pub fn of<T: Reflect + ?Sized>(value: &T) -> Self {
        value.reflect()
    }
}

/// Implement [`Reflect`] for a struct by listing its fields in
/// declaration order.
///
/// ```
/// use shapediff_value::{reflect_struct, Reflect, Type, Value};
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
/// reflect_struct!(Point { x, y });
///
/// let v = Point { x: 1, y: 2 }.reflect();
/// assert_eq!(v.ty(), Some(Type::named("Point")));
/// ```
#[macro_export]
macro_rules! reflect_struct {
    ($name:ident { $($field:ident),* $(,)? }) => {
        impl $crate::Reflect for $name {
            fn reflect_type() -> $crate::Type {
                $crate::Type::named(stringify!($name))
            }

            fn reflect(&self) -> $crate::Value {
                $crate::Value::record::<&str>(
                    stringify!($name),
                    vec![$((stringify!($field), $crate::Reflect::reflect(&self.$field))),*],
                )
            }
        }
    };
}
