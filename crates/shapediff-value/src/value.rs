//! The dynamic value graph.
//!
//! [`Value`] mirrors the runtime values of a reflective language: scalars
//! are held inline, while pointers, slices and maps live in shared cells.
//! Cloning a `Value` shares those cells, so aliasing and cycles can be
//! expressed by assigning a value through one of its own pointers.
//!
//! Cells are only ever mutated through the short-lived setters on `Value`
//! ([`Value::set_pointee`], [`Value::set_index`], [`Value::map_insert`]);
//! no mutable borrow outlives those calls, so readers may borrow freely.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{ValueError, ValueResult};
use crate::key::Key;
use crate::types::{FloatWidth, IntWidth, Kind, Type};

/// A complex number with `f64` components.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}{:+}i)", self.re, self.im)
    }
}

/// Opaque reference identity for channels and functions.
#[derive(Clone)]
pub struct Identity(Rc<()>);

impl Identity {
    pub fn new() -> Self {
        Self(Rc::new(()))
    }

    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({:#x})", self.addr())
    }
}

/// A channel handle. Nil when it has no identity.
#[derive(Clone, Debug, PartialEq)]
pub struct ChanRef {
    elem: Type,
    id: Option<Identity>,
}

impl ChanRef {
    pub fn elem(&self) -> &Type {
        &self.elem
    }

    pub fn addr(&self) -> Option<usize> {
        self.id.as_ref().map(Identity::addr)
    }
}

/// A function handle. Nil when it has no identity.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncRef {
    signature: Arc<str>,
    id: Option<Identity>,
}

impl FuncRef {
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn addr(&self) -> Option<usize> {
        self.id.as_ref().map(Identity::addr)
    }
}

fn cell_addr<T>(cell: &Option<Rc<RefCell<T>>>) -> Option<usize> {
    cell.as_ref().map(|c| Rc::as_ptr(c) as *const () as usize)
}

fn same_cell<T>(a: &Option<Rc<RefCell<T>>>, b: &Option<Rc<RefCell<T>>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// A pointer to a shared value cell.
#[derive(Clone)]
pub struct PtrRef {
    elem: Type,
    cell: Option<Rc<RefCell<Value>>>,
}

impl PtrRef {
    pub fn elem(&self) -> &Type {
        &self.elem
    }

    pub fn is_nil(&self) -> bool {
        self.cell.is_none()
    }

    pub fn addr(&self) -> Option<usize> {
        cell_addr(&self.cell)
    }

    /// Borrow the pointee. `None` for a nil pointer.
    pub fn get(&self) -> Option<Ref<'_, Value>> {
        self.cell.as_ref().map(|c| c.borrow())
    }

    /// Whether both pointers refer to the same cell.
    pub fn same_as(&self, other: &Self) -> bool {
        same_cell(&self.cell, &other.cell)
    }
}

impl fmt::Debug for PtrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr() {
            Some(addr) => write!(f, "Ptr<{}>({addr:#x})", self.elem),
            None => write!(f, "Ptr<{}>(nil)", self.elem),
        }
    }
}

/// A fixed-length sequence whose length is part of its type.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayValue {
    elem: Type,
    items: Vec<Value>,
}

impl ArrayValue {
    pub fn elem(&self) -> &Type {
        &self.elem
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

/// A growable sequence stored in a shared cell.
#[derive(Clone)]
pub struct SliceRef {
    elem: Type,
    cell: Option<Rc<RefCell<Vec<Value>>>>,
}

impl SliceRef {
    pub fn elem(&self) -> &Type {
        &self.elem
    }

    pub fn is_nil(&self) -> bool {
        self.cell.is_none()
    }

    pub fn addr(&self) -> Option<usize> {
        cell_addr(&self.cell)
    }

    pub fn len(&self) -> usize {
        self.cell.as_ref().map_or(0, |c| c.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the items. `None` for a nil slice.
    pub fn items(&self) -> Option<Ref<'_, Vec<Value>>> {
        self.cell.as_ref().map(|c| c.borrow())
    }

    pub fn same_as(&self, other: &Self) -> bool {
        same_cell(&self.cell, &other.cell)
    }
}

impl fmt::Debug for SliceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr() {
            Some(addr) => write!(f, "Vec<{}>({addr:#x}, len={})", self.elem, self.len()),
            None => write!(f, "Vec<{}>(nil)", self.elem),
        }
    }
}

/// Insertion-ordered map entries, indexed by comparison key.
///
/// Entries whose key is not comparable are kept but can never be looked up.
#[derive(Clone, Default)]
pub struct MapEntries {
    entries: Vec<(Value, Value)>,
    index: HashMap<Key, usize>,
}

impl MapEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        let key = key.comparable_key()?;
        self.index.get(&key).map(|&i| &self.entries[i].1)
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match key.comparable_key() {
            Some(k) => match self.index.get(&k) {
                Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
                None => {
                    self.index.insert(k, self.entries.len());
                    self.entries.push((key, value));
                    None
                }
            },
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }
}

impl FromIterator<(Value, Value)> for MapEntries {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut entries = Self::new();
        for (k, v) in iter {
            entries.insert(k, v);
        }
        entries
    }
}

/// An associative container stored in a shared cell.
#[derive(Clone)]
pub struct MapRef {
    key: Type,
    value: Type,
    cell: Option<Rc<RefCell<MapEntries>>>,
}

impl MapRef {
    pub fn key_type(&self) -> &Type {
        &self.key
    }

    pub fn value_type(&self) -> &Type {
        &self.value
    }

    pub fn is_nil(&self) -> bool {
        self.cell.is_none()
    }

    pub fn addr(&self) -> Option<usize> {
        cell_addr(&self.cell)
    }

    pub fn len(&self) -> usize {
        self.cell.as_ref().map_or(0, |c| c.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the entries. `None` for a nil map.
    pub fn entries(&self) -> Option<Ref<'_, MapEntries>> {
        self.cell.as_ref().map(|c| c.borrow())
    }

    pub fn same_as(&self, other: &Self) -> bool {
        same_cell(&self.cell, &other.cell)
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr() {
            Some(addr) => write!(
                f,
                "Map<{}, {}>({addr:#x}, len={})",
                self.key,
                self.value,
                self.len()
            ),
            None => write!(f, "Map<{}, {}>(nil)", self.key, self.value),
        }
    }
}

/// A named record with ordered fields.
#[derive(Clone, Debug, PartialEq)]
pub struct StructValue {
    name: Arc<str>,
    fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    /// The untyped nil.
    Nil,
    /// No value at all.
    Invalid,
    Bool(bool),
    Int(IntWidth, i64),
    Uint(IntWidth, u64),
    Float(FloatWidth, f64),
    Complex(FloatWidth, Complex),
    String(String),
    UnsafePointer(usize),
    Chan(ChanRef),
    Func(FuncRef),
    /// An interface slot holding a dynamic value, or nil.
    Interface(Option<Box<Value>>),
    Ptr(PtrRef),
    Array(ArrayValue),
    Slice(SliceRef),
    Map(MapRef),
    Struct(StructValue),
}

impl Value {
    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// A pointer to a new cell holding `value`, typed after the value.
    pub fn pointer(value: Value) -> Self {
        let elem = value.ty().unwrap_or(Type::Interface);
        Self::pointer_to(elem, value)
    }

    pub fn pointer_to(elem: Type, value: Value) -> Self {
        Self::Ptr(PtrRef {
            elem,
            cell: Some(Rc::new(RefCell::new(value))),
        })
    }

    pub fn nil_pointer(elem: Type) -> Self {
        Self::Ptr(PtrRef { elem, cell: None })
    }

    pub fn interface(value: Value) -> Self {
        Self::Interface(Some(Box::new(value)))
    }

    pub fn nil_interface() -> Self {
        Self::Interface(None)
    }

    pub fn array(elem: Type, items: Vec<Value>) -> Self {
        Self::Array(ArrayValue { elem, items })
    }

    pub fn slice(elem: Type, items: Vec<Value>) -> Self {
        Self::Slice(SliceRef {
            elem,
            cell: Some(Rc::new(RefCell::new(items))),
        })
    }

    pub fn nil_slice(elem: Type) -> Self {
        Self::Slice(SliceRef { elem, cell: None })
    }

    /// Build a map. Every key must have the declared key type; use
    /// [`Value::try_map`] when the entries come from untrusted input.
    pub fn map<I>(key: Type, value: Type, entries: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let entries: MapEntries = entries
            .into_iter()
            .inspect(|(k, _)| {
                debug_assert!(key_fits(&key, k), "map key {k:?} is not of type {key}")
            })
            .collect();
        Self::Map(MapRef {
            key,
            value,
            cell: Some(Rc::new(RefCell::new(entries))),
        })
    }

    /// Build a map, rejecting keys that do not have the declared key type.
    pub fn try_map<I>(key: Type, value: Type, entries: I) -> ValueResult<Self>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut checked = MapEntries::new();
        for (k, v) in entries {
            check_key(&key, &k)?;
            checked.insert(k, v);
        }
        Ok(Self::Map(MapRef {
            key,
            value,
            cell: Some(Rc::new(RefCell::new(checked))),
        }))
    }

    pub fn nil_map(key: Type, value: Type) -> Self {
        Self::Map(MapRef {
            key,
            value,
            cell: None,
        })
    }

    pub fn record<N: Into<String>>(name: &str, fields: Vec<(N, Value)>) -> Self {
        Self::Struct(StructValue {
            name: Arc::from(name),
            fields: fields.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        })
    }

    /// A non-nil function value with a fresh identity.
    pub fn func(signature: &str) -> Self {
        Self::Func(FuncRef {
            signature: Arc::from(signature),
            id: Some(Identity::new()),
        })
    }

    pub fn nil_func(signature: &str) -> Self {
        Self::Func(FuncRef {
            signature: Arc::from(signature),
            id: None,
        })
    }

    /// A non-nil channel with a fresh identity.
    pub fn chan(elem: Type) -> Self {
        Self::Chan(ChanRef {
            elem,
            id: Some(Identity::new()),
        })
    }

    pub fn nil_chan(elem: Type) -> Self {
        Self::Chan(ChanRef { elem, id: None })
    }

    // ---------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------

    /// The dynamic type. `None` for [`Value::Nil`] and [`Value::Invalid`].
    pub fn ty(&self) -> Option<Type> {
        Some(match self {
            Self::Nil | Self::Invalid => return None,
            Self::Bool(_) => Type::Bool,
            Self::Int(w, _) => Type::Int(*w),
            Self::Uint(w, _) => Type::Uint(*w),
            Self::Float(w, _) => Type::Float(*w),
            Self::Complex(w, _) => Type::Complex(*w),
            Self::String(_) => Type::String,
            Self::UnsafePointer(_) => Type::UnsafePointer,
            Self::Chan(c) => Type::chan(c.elem.clone()),
            Self::Func(f) => Type::Func(Arc::clone(&f.signature)),
            Self::Interface(_) => Type::Interface,
            Self::Ptr(p) => Type::ptr(p.elem.clone()),
            Self::Array(a) => Type::array(a.elem.clone(), a.items.len()),
            Self::Slice(s) => Type::slice(s.elem.clone()),
            Self::Map(m) => Type::map(m.key.clone(), m.value.clone()),
            Self::Struct(s) => Type::Struct(Arc::clone(&s.name)),
        })
    }

    pub fn kind(&self) -> Option<Kind> {
        self.ty().map(|t| t.kind())
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Whether this is the untyped nil or a nil reference.
    pub fn is_nil(&self) -> bool {
        match self {
            Self::Nil => true,
            Self::Chan(c) => c.id.is_none(),
            Self::Func(f) => f.id.is_none(),
            Self::Interface(inner) => inner.is_none(),
            Self::Ptr(p) => p.is_nil(),
            Self::Slice(s) => s.is_nil(),
            Self::Map(m) => m.is_nil(),
            _ => false,
        }
    }

    /// Whether this is the zero value of its type.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Nil => true,
            Self::Invalid => false,
            Self::Bool(b) => !b,
            Self::Int(_, v) => *v == 0,
            Self::Uint(_, v) => *v == 0,
            Self::Float(_, v) => v.to_bits() == 0,
            Self::Complex(_, c) => c.re.to_bits() == 0 && c.im.to_bits() == 0,
            Self::String(s) => s.is_empty(),
            Self::UnsafePointer(addr) => *addr == 0,
            Self::Array(a) => a.items.iter().all(Value::is_zero),
            Self::Struct(s) => s.fields.iter().all(|(_, v)| v.is_zero()),
            Self::Chan(_) | Self::Func(_) | Self::Interface(_) | Self::Ptr(_) | Self::Slice(_)
            | Self::Map(_) => self.is_nil(),
        }
    }

    /// Length of arrays, slices and maps. Nil slices and maps have length 0.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Array(a) => Some(a.items.len()),
            Self::Slice(s) => Some(s.len()),
            Self::Map(m) => Some(m.len()),
            _ => None,
        }
    }

    /// Address of the shared cell behind a non-nil pointer, slice or map.
    pub fn cell_addr(&self) -> Option<usize> {
        match self {
            Self::Ptr(p) => p.addr(),
            Self::Slice(s) => s.addr(),
            Self::Map(m) => m.addr(),
            _ => None,
        }
    }

    /// Normalize scalars to their widest representative so that equal
    /// numbers of different widths render identically.
    pub fn canonical(&self) -> Value {
        match self {
            Self::Int(_, v) => Self::Int(IntWidth::W64, *v),
            Self::Uint(_, v) => Self::Uint(IntWidth::W64, *v),
            Self::Float(_, v) => Self::Float(FloatWidth::W64, *v),
            Self::Complex(_, c) => Self::Complex(FloatWidth::W64, *c),
            other => other.clone(),
        }
    }

    /// A clone of the pointee of a non-nil pointer.
    pub fn pointee(&self) -> Option<Value> {
        match self {
            Self::Ptr(p) => p.get().map(|v| v.clone()),
            _ => None,
        }
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Replace the value a pointer refers to. Every alias observes the change.
    pub fn set_pointee(&self, value: Value) -> ValueResult<()> {
        match self {
            Self::Ptr(PtrRef {
                cell: Some(cell), ..
            }) => {
                *cell.borrow_mut() = value;
                Ok(())
            }
            Self::Ptr(p) => Err(ValueError::NilReference(Type::ptr(p.elem.clone()))),
            other => Err(unexpected("pointer", other)),
        }
    }

    /// Replace one element of a slice in place.
    pub fn set_index(&self, index: usize, value: Value) -> ValueResult<()> {
        match self {
            Self::Slice(SliceRef {
                cell: Some(cell), ..
            }) => {
                let mut items = cell.borrow_mut();
                let len = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or(ValueError::IndexOutOfRange { index, len })?;
                *slot = value;
                Ok(())
            }
            Self::Slice(s) => Err(ValueError::NilReference(Type::slice(s.elem.clone()))),
            other => Err(unexpected("slice", other)),
        }
    }

    /// Insert into a map in place, returning the replaced value.
    pub fn map_insert(&self, key: Value, value: Value) -> ValueResult<Option<Value>> {
        match self {
            Self::Map(MapRef {
                key: key_ty,
                cell: Some(cell),
                ..
            }) => {
                check_key(key_ty, &key)?;
                Ok(cell.borrow_mut().insert(key, value))
            }
            Self::Map(m) => Err(ValueError::NilReference(Type::map(
                m.key.clone(),
                m.value.clone(),
            ))),
            other => Err(unexpected("map", other)),
        }
    }

    /// Replace a struct field.
    pub fn set_field(&mut self, name: &str, value: Value) -> ValueResult<()> {
        match self {
            Self::Struct(s) => {
                let slot = s
                    .fields
                    .iter_mut()
                    .find(|(n, _)| n == name)
                    .ok_or_else(|| ValueError::NoSuchField {
                        name: s.name.to_string(),
                        field: name.to_string(),
                    })?;
                slot.1 = value;
                Ok(())
            }
            other => Err(unexpected("struct", other)),
        }
    }
}

fn key_fits(declared: &Type, key: &Value) -> bool {
    key.ty().as_ref() == Some(declared)
}

fn check_key(declared: &Type, key: &Value) -> ValueResult<()> {
    if key_fits(declared, key) {
        Ok(())
    } else {
        Err(unexpected("map key of the declared key type", key))
    }
}

fn unexpected(expected: &'static str, actual: &Value) -> ValueError {
    ValueError::UnexpectedKind {
        expected,
        actual: actual
            .ty()
            .map_or_else(|| "<nil>".to_string(), |t| t.to_string()),
    }
}

/// Raw equality: scalars by value, references by identity, arrays,
/// structs and interfaces element-wise. Never follows a shared cell.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) | (Self::Invalid, Self::Invalid) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(wa, a), Self::Int(wb, b)) => wa == wb && a == b,
            (Self::Uint(wa, a), Self::Uint(wb, b)) => wa == wb && a == b,
            (Self::Float(wa, a), Self::Float(wb, b)) => wa == wb && a == b,
            (Self::Complex(wa, a), Self::Complex(wb, b)) => wa == wb && a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::UnsafePointer(a), Self::UnsafePointer(b)) => a == b,
            (Self::Chan(a), Self::Chan(b)) => a == b,
            (Self::Func(a), Self::Func(b)) => a == b,
            (Self::Interface(a), Self::Interface(b)) => a == b,
            (Self::Ptr(a), Self::Ptr(b)) => a.elem == b.elem && a.same_as(b),
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Slice(a), Self::Slice(b)) => a.elem == b.elem && a.same_as(b),
            (Self::Map(a), Self::Map(b)) => {
                a.key == b.key && a.value == b.value && a.same_as(b)
            }
            (Self::Struct(a), Self::Struct(b)) => a == b,
            _ => false,
        }
    }
}
