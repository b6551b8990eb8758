//! Shape-tolerant structural comparison.
//!
//! Values are compared by what they look like rather than by their exact
//! types: pointers and interface slots are unwrapped completely, any two
//! sequences compare element by element, and structs compare against
//! `String`-keyed maps by matching field names to keys. Scalars compare
//! within width-independent classes, so `1i8` equals `1i64` but not `1u8`.
//!
//! In unordered mode, sequences whose elements are all comparable are
//! compared as multisets. A mismatch is then reported once for the whole
//! sequence since positions no longer correspond.

use std::cell::Ref;
use std::collections::{HashMap, HashSet};
use std::ops::Deref;

use shapediff_value::{Key, MapEntries, MapRef, Type, Value};
use tracing::{debug, trace};

use crate::record::{field_segment, index_segment, Cause, Diff, Recorder};
use crate::shape::{ScalarClass, Shape};
use crate::strict::present;
use crate::visit::{PairKey, VisitGuard};

/// Compare `a` against `b` by shape, optionally ignoring sequence order.
pub fn tolerant_diff(a: &Value, b: &Value, unordered: bool) -> Vec<Diff> {
    debug!(a = ?a.ty(), b = ?b.ty(), unordered, "tolerant diff");
    let mut walker = TolerantWalker {
        rec: Recorder::new(),
        visited: VisitGuard::new(),
        unordered,
    };
    match (a, b) {
        (Value::Nil, Value::Nil) => {}
        (Value::Nil, _) | (_, Value::Nil) => walker.rec.report(Cause::values(a, b)),
        _ => walker.walk(a, b),
    }
    let visited = walker.visited.len();
    let diffs = walker.rec.finish();
    debug!(diffs = diffs.len(), visited, "tolerant diff complete");
    diffs
}

// ---------------------------------------------------------------------------
// Dereferencing
// ---------------------------------------------------------------------------

fn unwrap_interfaces(mut v: &Value) -> &Value {
    while let Value::Interface(Some(inner)) = v {
        v = inner;
    }
    v
}

/// Run `f` on the value reached by following pointers and interface slots
/// until neither remains. A pointer chain that loops back on itself stops at
/// the first repeated pointer.
fn with_target<R>(v: &Value, f: impl FnOnce(&Value) -> R) -> R {
    follow(v, &mut Vec::new(), f)
}

fn follow<R, F: FnOnce(&Value) -> R>(v: &Value, seen: &mut Vec<usize>, f: F) -> R {
    match v {
        Value::Interface(Some(inner)) => follow(inner, seen, f),
        Value::Ptr(p) => match (p.get(), p.addr()) {
            (Some(target), Some(addr)) if !seen.contains(&addr) => {
                seen.push(addr);
                follow(&target, seen, f)
            }
            _ => f(v),
        },
        _ => f(v),
    }
}

// ---------------------------------------------------------------------------
// Capability views
// ---------------------------------------------------------------------------

/// Elements of an indexed value. Nil counts as empty.
enum Items<'a> {
    Fixed(&'a [Value]),
    Shared(Ref<'a, Vec<Value>>),
    Empty,
}

impl<'a> Items<'a> {
    fn of(v: &'a Value) -> Self {
        match v {
            Value::Array(a) => Self::Fixed(a.items()),
            Value::Slice(s) => s.items().map_or(Self::Empty, Self::Shared),
            _ => Self::Empty,
        }
    }
}

impl Deref for Items<'_> {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        match self {
            Self::Fixed(items) => *items,
            Self::Shared(items) => items.as_slice(),
            Self::Empty => &[],
        }
    }
}

/// Named members of a fielded value. Nil counts as having none.
enum Fields<'a> {
    Record(&'a [(String, Value)]),
    Keyed(Ref<'a, MapEntries>),
    Empty,
}

impl<'a> Fields<'a> {
    fn of(v: &'a Value) -> Self {
        match v {
            Value::Struct(s) => Self::Record(s.fields()),
            Value::Map(m) => m.entries().map_or(Self::Empty, Self::Keyed),
            _ => Self::Empty,
        }
    }

    fn list(&self) -> Vec<(&str, &Value)> {
        match self {
            Self::Record(fields) => fields.iter().map(|(n, v)| (n.as_str(), v)).collect(),
            Self::Keyed(entries) => entries
                .iter()
                .map(|(k, v)| match k {
                    Value::String(name) => (name.as_str(), v),
                    other => unreachable!("string-keyed map holds key {other:?}"),
                })
                .collect(),
            Self::Empty => Vec::new(),
        }
    }
}

/// Dereferenced elements of a sequence whose elements are all comparable
/// and share one kind.
struct Comparables {
    elem: Option<Type>,
    keys: Vec<Key>,
    values: Vec<Value>,
}

impl Comparables {
    fn of(items: &[Value]) -> Option<Self> {
        let mut elem: Option<Type> = None;
        let mut keys = Vec::with_capacity(items.len());
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let target = with_target(item, Value::clone);
            let ty = target.ty().unwrap_or(Type::Interface);
            match elem.as_ref().map(Type::kind) {
                Some(kind) if kind != ty.kind() => return None,
                Some(_) => {}
                None => elem = Some(ty),
            }
            keys.push(target.comparable_key()?);
            values.push(target);
        }
        Some(Self { elem, keys, values })
    }

    /// Same elements with the same multiplicities, in any order.
    fn same_multiset(&self, other: &Self) -> bool {
        let mut counts: HashMap<&Key, isize> = HashMap::new();
        for k in &self.keys {
            *counts.entry(k).or_default() += 1;
        }
        for k in &other.keys {
            *counts.entry(k).or_default() -= 1;
        }
        counts.values().all(|&c| c == 0)
    }

    fn into_value(self) -> Value {
        Value::slice(self.elem.unwrap_or(Type::Interface), self.values)
    }
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

struct TolerantWalker {
    rec: Recorder,
    visited: VisitGuard<PairKey>,
    unordered: bool,
}

impl TolerantWalker {
    fn descend(&mut self, segment: String, a: &Value, b: &Value) {
        self.rec.enter(segment);
        self.walk(a, b);
        self.rec.leave();
    }

    fn walk(&mut self, a: &Value, b: &Value) {
        if !a.is_valid() || !b.is_valid() {
            self.rec.report(Cause::Invalid {
                valid_a: a.is_valid(),
                valid_b: b.is_valid(),
            });
            return;
        }

        if let Some(pair) = PairKey::of(unwrap_interfaces(a), unwrap_interfaces(b)) {
            if !self.visited.first_visit(pair) {
                trace!(?pair, "pair already under comparison");
                return;
            }
        }
        if let (Value::Ptr(x), Value::Ptr(y)) = (a, b) {
            if x.same_as(y) {
                return;
            }
        }

        with_target(a, |da| with_target(b, |db| self.compare(da, db)));
    }

    /// Compare two fully dereferenced values.
    fn compare(&mut self, a: &Value, b: &Value) {
        let (nil_a, nil_b) = (a.is_nil(), b.is_nil());
        if nil_a && nil_b {
            return;
        }

        // Both sides ran into a pointer cycle. Walking the remnants again
        // reaches an already visited pair.
        if let (Value::Ptr(_), Value::Ptr(_), false, false) = (a, b, nil_a, nil_b) {
            self.walk(a, b);
            return;
        }

        let (sa, sb) = (Shape::of(a), Shape::of(b));
        if sa == Shape::Function || sb == Shape::Function {
            self.functions(a, b, sa, sb);
            return;
        }

        let (indexed_a, indexed_b) = (sa == Shape::Indexed, sb == Shape::Indexed);
        if (indexed_a || nil_a) && (indexed_b || nil_b) {
            self.indexed(a, b);
            return;
        }
        if indexed_a != indexed_b {
            self.rec.report(Cause::types(a, b));
            return;
        }

        let (fielded_a, fielded_b) = (sa == Shape::Fielded, sb == Shape::Fielded);
        if (fielded_a || nil_a) && (fielded_b || nil_b) {
            self.fielded(a, b);
            return;
        }
        if fielded_a != fielded_b {
            self.rec.report(Cause::types(a, b));
            return;
        }

        match (a, b) {
            (Value::Map(x), Value::Map(y)) => self.associative(a, b, x, y),
            _ => self.scalars(a, b),
        }
    }

    fn functions(&mut self, a: &Value, b: &Value, sa: Shape, sb: Shape) {
        let other_nil = if sa == Shape::Function {
            b.is_nil()
        } else {
            a.is_nil()
        };
        if sa != sb && !other_nil {
            self.rec.report(Cause::types(a, b));
        } else if a.is_nil() || b.is_nil() {
            self.rec.report(Cause::values(a, b));
        } else {
            self.rec.report(Cause::funcs(a, b));
        }
    }

    fn indexed(&mut self, a: &Value, b: &Value) {
        let (xs, ys) = (Items::of(a), Items::of(b));
        if xs.len() != ys.len() {
            self.rec.report(Cause::lengths(a, b, xs.len(), ys.len()));
            return;
        }

        if self.unordered {
            if let (Some(cx), Some(cy)) = (Comparables::of(&xs), Comparables::of(&ys)) {
                if cx.elem == cy.elem {
                    if !cx.same_multiset(&cy) {
                        self.rec
                            .report(Cause::values(&cx.into_value(), &cy.into_value()));
                    }
                    return;
                }
            }
        }

        for (i, (x, y)) in xs.iter().zip(ys.iter()).enumerate() {
            self.descend(index_segment(i), x, y);
        }
    }

    fn fielded(&mut self, a: &Value, b: &Value) {
        let (fx, fy) = (Fields::of(a), Fields::of(b));
        let (lx, ly) = (fx.list(), fy.list());
        let names_x: HashSet<&str> = lx.iter().map(|(n, _)| *n).collect();
        let by_name_y: HashMap<&str, &Value> = ly.iter().copied().collect();

        for (name, vx) in &lx {
            match by_name_y.get(name) {
                Some(vy) => self.descend(field_segment(name), vx, vy),
                None => self.rec.report_at(field_segment(name), Cause::only_on_a(name)),
            }
        }
        for (name, _) in &ly {
            if !names_x.contains(name) {
                self.rec.report_at(field_segment(name), Cause::only_on_b(name));
            }
        }
    }

    /// Maps keyed by anything other than `String`. Nil counts as empty.
    fn associative(&mut self, a: &Value, b: &Value, x: &MapRef, y: &MapRef) {
        if x.same_as(y) {
            return;
        }
        let empty = MapEntries::new();
        let xe = x.entries();
        let ye = y.entries();
        let xe: &MapEntries = xe.as_deref().unwrap_or(&empty);
        let ye: &MapEntries = ye.as_deref().unwrap_or(&empty);
        if xe.len() != ye.len() {
            self.rec.report(Cause::lengths(a, b, xe.len(), ye.len()));
            return;
        }

        for (k, vx) in xe.iter() {
            match ye.get(k) {
                Some(vy) if present(vy) => self.descend(field_segment(k), vx, vy),
                _ => self.rec.report_at(field_segment(k), Cause::only_on_a(k)),
            }
        }
        for (k, vy) in ye.iter() {
            if !xe.get(k).is_some_and(present) {
                self.rec.report_at(field_segment(k), Cause::only_on_b(k));
            }
        }
    }

    fn scalars(&mut self, a: &Value, b: &Value) {
        match (ScalarClass::of(a), ScalarClass::of(b)) {
            (Some(ca), Some(cb)) if ca == cb => {
                if ca == ScalarClass::Chan && a.ty() != b.ty() {
                    self.rec.report(Cause::types(a, b));
                } else if !same_scalar(a, b) {
                    self.rec.report(Cause::values(&a.canonical(), &b.canonical()));
                }
            }
            _ => self.rec.report(Cause::types(a, b)),
        }
    }
}

/// Equality within one scalar class. Floats of different widths are
/// compared at the narrower width.
fn same_scalar(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(wa, x), Value::Float(wb, y)) if wa != wb => same_narrow(*x, *y),
        (Value::Complex(wa, x), Value::Complex(wb, y)) if wa != wb => {
            same_narrow(x.re, y.re) && same_narrow(x.im, y.im)
        }
        _ => a.comparable_key() == b.comparable_key(),
    }
}

fn same_narrow(x: f64, y: f64) -> bool {
    let (x, y) = (x as f32, y as f32);
    x == y || (x.is_nan() && y.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shapediff_value::{reflect_struct, IntWidth, Reflect};
    use std::collections::BTreeMap;

    #[derive(Clone, Default)]
    struct OtherStruct {
        a: Vec<OtherStruct>,
        b: BTreeMap<String, Vec<i64>>,
        d: u8,
        e: bool,
    }
    reflect_struct!(OtherStruct { a, b, d, e });

    #[derive(Clone, Default)]
    struct SampleStruct {
        a: i64,
        b: String,
        c: OtherStruct,
        d: Option<OtherStruct>,
    }
    reflect_struct!(SampleStruct { a, b, c, d });

    fn paths(diffs: &[Diff]) -> Vec<Vec<String>> {
        diffs.iter().map(|d| d.path.clone()).collect()
    }

    fn string_map(entries: Vec<(&str, Value)>) -> Value {
        Value::map(
            Type::String,
            Type::Interface,
            entries
                .into_iter()
                .map(|(k, v)| (Value::from(k), v.reflect())),
        )
    }

    fn with_ds(ds: &[u8]) -> Vec<OtherStruct> {
        ds.iter()
            .map(|&d| OtherStruct { d, ..Default::default() })
            .collect()
    }

    #[test]
    fn top_level_nil_handling() {
        assert!(tolerant_diff(&Value::Nil, &Value::Nil, false).is_empty());
        let diffs = tolerant_diff(&Value::Nil, &Value::from(1i64), false);
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].path.is_empty());
        assert!(matches!(diffs[0].cause, Cause::Value { .. }));
    }

    #[test]
    fn pointers_and_interfaces_are_transparent() {
        let a = Value::pointer(Value::pointer(Value::from(3i64)));
        let b = Value::interface(Value::from(3i32));
        assert!(tolerant_diff(&a, &b, false).is_empty());

        let c = Value::interface(Value::pointer(Value::from(4i64)));
        let diffs = tolerant_diff(&a, &c, false);
        assert!(diffs[0].path.is_empty());
        assert_eq!(diffs[0].cause.to_string(), "values diff\nA=3\nB=4");
    }

    #[test]
    fn integer_widths_are_one_class() {
        assert!(tolerant_diff(&Value::from(7u8), &Value::from(7u64), false).is_empty());
        let diffs = tolerant_diff(&Value::from(7i64), &Value::from(7u64), false);
        assert!(matches!(diffs[0].cause, Cause::Type { .. }));
    }

    #[test]
    fn float_widths_compare_at_the_narrower_width() {
        assert!(tolerant_diff(&1.1f32.reflect(), &1.1f64.reflect(), false).is_empty());
        assert!(tolerant_diff(&f32::NAN.reflect(), &f64::NAN.reflect(), false).is_empty());

        let diffs = tolerant_diff(&1.1f32.reflect(), &1.2f64.reflect(), false);
        assert_eq!(diffs.len(), 1);
        assert!(matches!(diffs[0].cause, Cause::Value { .. }));
    }

    #[test]
    fn sequences_of_different_types_compare_positionally() {
        let a = vec!["a", "b"].reflect();
        let b = ["a", "c"].reflect();
        let diffs = tolerant_diff(&a, &b, false);
        assert_eq!(paths(&diffs), vec![vec!["[1]"]]);
        assert_eq!(diffs[0].cause, Cause::values(&Value::from("b"), &Value::from("c")));
    }

    #[test]
    fn nil_and_empty_sequences_are_equal() {
        let nil = Value::nil_slice(Type::Bool);
        let empty = Value::slice(Type::String, vec![]);
        assert!(tolerant_diff(&nil, &empty, false).is_empty());
        assert!(tolerant_diff(&Value::nil_pointer(Type::Bool), &empty, false).is_empty());

        let diffs = tolerant_diff(&nil, &vec![1i64].reflect(), false);
        assert!(matches!(diffs[0].cause, Cause::Length { delta: -1, .. }));
    }

    #[test]
    fn length_is_checked_before_contents() {
        let diffs = tolerant_diff(&vec![1i64, 2, 3].reflect(), &vec![9i64].reflect(), false);
        assert_eq!(diffs.len(), 1);
        assert!(matches!(diffs[0].cause, Cause::Length { delta: 2, .. }));
    }

    #[test]
    fn struct_against_string_keyed_map() {
        let a = string_map(vec![("A", Value::from(1i64)), ("B", Value::from(2i64))]);
        let b = Value::record("Pair", vec![("A", Value::from(1i64)), ("B", Value::from(3i64))]);
        let diffs = tolerant_diff(&a, &b, false);
        assert_eq!(paths(&diffs), vec![vec!["[B]"]]);
        assert_eq!(diffs[0].cause, Cause::values(&Value::from(2i64), &Value::from(3i64)));

        let c = Value::record("Pair", vec![("A", Value::from(1i64)), ("C", Value::from(3i64))]);
        let diffs = tolerant_diff(&a, &c, false);
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].path, ["[B]"]);
        assert_eq!(diffs[0].cause, Cause::only_on_a("B"));
        assert_eq!(diffs[1].path, ["[C]"]);
        assert_eq!(diffs[1].cause, Cause::only_on_b("C"));
    }

    #[test]
    fn capability_mismatch_is_a_type_diff() {
        let seq = vec![1i64].reflect();
        let rec = Value::record("One", vec![("a", Value::from(1i64))]);
        let diffs = tolerant_diff(&seq, &rec, false);
        assert_eq!(diffs.len(), 1);
        assert!(matches!(diffs[0].cause, Cause::Type { .. }));

        let diffs = tolerant_diff(&Value::from(1i64), &rec, false);
        assert!(matches!(diffs[0].cause, Cause::Type { .. }));
    }

    #[test]
    fn non_string_keyed_maps_compare_by_key() {
        let mut a = BTreeMap::new();
        a.insert(1i64, "x");
        a.insert(2i64, "y");
        let mut b = BTreeMap::new();
        b.insert(1i64, "x");
        b.insert(3i64, "y");

        let diffs = tolerant_diff(&a.reflect(), &b.reflect(), false);
        assert_eq!(paths(&diffs), vec![vec!["[2]"], vec!["[3]"]]);
        assert_eq!(diffs[0].cause, Cause::only_on_a("2"));
        assert_eq!(diffs[1].cause, Cause::only_on_b("3"));
    }

    #[test]
    fn zero_valued_entries_count_as_missing() {
        let build = || {
            let mut m = BTreeMap::new();
            m.insert(1i64, 0i64);
            m.reflect()
        };
        let diffs = tolerant_diff(&build(), &build(), false);
        assert_eq!(paths(&diffs), vec![vec!["[1]"], vec!["[1]"]]);
        assert_eq!(diffs[0].cause, Cause::only_on_a("1"));
        assert_eq!(diffs[1].cause, Cause::only_on_b("1"));

        let shared = build();
        assert!(tolerant_diff(&shared, &shared.clone(), false).is_empty());
    }

    #[test]
    fn invalid_values_are_reported() {
        let diffs = tolerant_diff(&Value::from(1i64), &Value::Invalid, false);
        assert_eq!(paths(&diffs), vec![Vec::<String>::new()]);
        assert_eq!(
            diffs[0].cause,
            Cause::Invalid {
                valid_a: true,
                valid_b: false
            }
        );
        assert_eq!(diffs[0].cause.to_string(), "invalid value");

        let nested = || Value::record("Holder", vec![("slot", Value::Invalid)]);
        let diffs = tolerant_diff(&nested(), &nested(), false);
        assert_eq!(paths(&diffs), vec![vec!["[slot]"]]);
        assert_eq!(
            diffs[0].cause,
            Cause::Invalid {
                valid_a: false,
                valid_b: false
            }
        );
    }

    #[test]
    fn nested_struct_against_nested_maps() {
        let expected = SampleStruct {
            a: 1,
            b: "b1".into(),
            c: OtherStruct {
                a: with_ds(&[1, 2, 3]),
                ..Default::default()
            },
            d: Some(OtherStruct::default()),
        };
        let actual = string_map(vec![
            ("a", Value::from(2i64)),
            ("b", Value::from("b2")),
            (
                "c",
                string_map(vec![
                    ("a", with_ds(&[1, 2, 4]).reflect()),
                    ("b", Value::Nil),
                    ("d", Value::from(0u8)),
                    ("e", Value::from(false)),
                ]),
            ),
            ("d", Value::Nil),
        ]);

        let diffs = tolerant_diff(&expected.reflect(), &actual, false);
        assert_eq!(
            paths(&diffs),
            vec![
                vec!["[a]"],
                vec!["[b]"],
                vec!["[c]", "[a]", "[2]", "[d]"],
                vec!["[d]", "[a]"],
                vec!["[d]", "[b]"],
                vec!["[d]", "[d]"],
                vec!["[d]", "[e]"],
            ]
        );
        assert_eq!(
            diffs[2].cause,
            Cause::values(&Value::Uint(IntWidth::W64, 3), &Value::Uint(IntWidth::W64, 4))
        );
        assert_eq!(diffs[3].cause, Cause::only_on_a("a"));
    }

    #[test]
    fn unordered_ignores_positions() {
        let a = vec![1i64, 2, 3].reflect();
        let b = vec![3i64, 1, 2].reflect();
        assert!(tolerant_diff(&a, &b, true).is_empty());
        assert_eq!(tolerant_diff(&a, &b, false).len(), 3);
    }

    #[test]
    fn unordered_mismatch_is_one_whole_sequence_diff() {
        let a = vec![1i64, 2, 3].reflect();
        let b = vec![3i64, 1, 4].reflect();
        let diffs = tolerant_diff(&a, &b, true);
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].path.is_empty());
        assert_eq!(diffs[0].cause.to_string(), "values diff\nA=[1 2 3]\nB=[3 1 4]");
    }

    #[test]
    fn unordered_respects_multiplicity() {
        let a = vec!["x", "x", "y"].reflect();
        let b = vec!["x", "y", "y"].reflect();
        assert_eq!(tolerant_diff(&a, &b, true).len(), 1);
    }

    #[test]
    fn unordered_dereferences_elements() {
        let a = vec![Some(1i64), Some(2)].reflect();
        let b = vec![Some(2i64), Some(1)].reflect();
        assert!(tolerant_diff(&a, &b, true).is_empty());
    }

    #[test]
    fn unordered_falls_back_for_incomparable_elements() {
        let a = vec![vec![1i64], vec![2]].reflect();
        let b = vec![vec![2i64], vec![1]].reflect();
        let diffs = tolerant_diff(&a, &b, true);
        assert_eq!(paths(&diffs), vec![vec!["[0]"], vec!["[1]"]]);
        assert!(diffs.iter().all(|d| matches!(d.cause, Cause::Value { .. })));
    }

    #[test]
    fn unordered_falls_back_for_mixed_kinds() {
        let a = Value::slice(
            Type::Interface,
            vec![Value::from(1i64).reflect(), Value::from("x").reflect()],
        );
        let b = Value::slice(
            Type::Interface,
            vec![Value::from("x").reflect(), Value::from(1i64).reflect()],
        );
        let diffs = tolerant_diff(&a, &b, true);
        assert_eq!(diffs.len(), 2);
        assert!(diffs.iter().all(|d| matches!(d.cause, Cause::Type { .. })));
    }

    #[test]
    fn functions() {
        let f = Value::func("fn()");
        let diffs = tolerant_diff(&f, &f.clone(), false);
        assert!(matches!(diffs[0].cause, Cause::Func { .. }));

        let diffs = tolerant_diff(&Value::nil_func("fn()"), &f, false);
        assert!(matches!(diffs[0].cause, Cause::Value { .. }));

        let diffs = tolerant_diff(&f, &Value::from(1i64), false);
        assert!(matches!(diffs[0].cause, Cause::Type { .. }));

        let nil_func = Value::nil_func("fn()");
        assert!(tolerant_diff(&nil_func, &Value::nil_pointer(Type::Bool), false).is_empty());
        let diffs = tolerant_diff(&f, &Value::nil_pointer(Type::Bool), false);
        assert!(matches!(diffs[0].cause, Cause::Value { .. }));
    }

    #[test]
    fn channels_need_equal_types() {
        let a = Value::chan(Type::Int(IntWidth::W64));
        let b = Value::chan(Type::String);
        let diffs = tolerant_diff(&a, &b, false);
        assert!(matches!(diffs[0].cause, Cause::Type { .. }));
        assert!(tolerant_diff(&a, &a.clone(), false).is_empty());
    }

    #[test]
    fn cycles_terminate() {
        let a = Value::pointer_to(Type::Interface, Value::nil_interface());
        a.set_pointee(Value::interface(a.clone())).unwrap();
        let b = Value::pointer_to(Type::Interface, Value::nil_interface());
        b.set_pointee(Value::interface(b.clone())).unwrap();
        assert!(tolerant_diff(&a, &b, false).is_empty());

        let s = Value::slice(Type::Interface, vec![Value::nil_interface()]);
        s.set_index(0, Value::interface(s.clone())).unwrap();
        let t = Value::slice(Type::Interface, vec![Value::nil_interface()]);
        t.set_index(0, Value::interface(t.clone())).unwrap();
        assert!(tolerant_diff(&s, &t, false).is_empty());
        assert!(tolerant_diff(&s, &t, true).is_empty());
    }

    #[test]
    fn json_documents_compare_against_structs() {
        let json = Value::from_json_str(r#"{"a": 1, "b": "b1", "d": null}"#).unwrap();
        let rec = Value::record(
            "Doc",
            vec![
                ("a", Value::from(1i64)),
                ("b", Value::from("b1")),
                ("d", Value::nil_pointer(Type::named("Doc"))),
            ],
        );
        assert!(tolerant_diff(&json, &rec, false).is_empty());
    }

    proptest! {
        #[test]
        fn reflexive(
            xs in proptest::collection::vec(any::<i32>(), 0..8),
            unordered in any::<bool>(),
        ) {
            let build = || string_map(vec![("xs", xs.reflect()), ("n", Value::from(xs.len()))]);
            prop_assert!(tolerant_diff(&build(), &build(), unordered).is_empty());
        }

        #[test]
        fn unordered_accepts_any_permutation(mut xs in proptest::collection::vec(0i64..5, 0..8)) {
            let a = xs.reflect();
            xs.reverse();
            prop_assert!(tolerant_diff(&a, &xs.reflect(), true).is_empty());
        }
    }
}
