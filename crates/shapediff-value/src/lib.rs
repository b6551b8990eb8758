//! Dynamic value model for shapediff.
//!
//! Rust has no runtime reflection, so the values compared by the diff
//! engines are expressed as an explicit graph of typed runtime values with
//! reference identity.
//!
//! # Key Types
//!
//! - [`Value`] -- A runtime value (scalar, handle, indirection or container)
//! - [`Type`] / [`Kind`] -- Dynamic type descriptors
//! - [`Key`] -- Hashable form of a comparable value
//! - [`Reflect`] -- Conversion from Rust data, with [`reflect_struct!`] for records

pub mod display;
pub mod error;
pub mod json;
pub mod key;
pub mod reflect;
pub mod types;
pub mod value;

pub use error::{ValueError, ValueResult};
pub use key::Key;
pub use reflect::Reflect;
pub use types::{FloatWidth, IntWidth, Kind, Type};
pub use value::{
    ArrayValue, ChanRef, Complex, FuncRef, Identity, MapEntries, MapRef, PtrRef, SliceRef,
    StructValue, Value,
};
