//! Type-strict structural comparison.
//!
//! Two values are equal when they have identical dynamic types and equal
//! contents all the way down. A type mismatch is reported once at the point
//! where it occurs and nothing below it is examined. Pointer and interface
//! indirections appear in paths as `[&]` and `[dyn]`.

use shapediff_value::{ArrayValue, FuncRef, MapRef, PtrRef, SliceRef, StructValue, Type, Value};
use tracing::{debug, trace};

use crate::record::{
    field_segment, index_segment, Cause, Diff, Recorder, DEREF_SEGMENT, DYN_SEGMENT,
};
use crate::shape::Shape;
use crate::visit::{PairKey, VisitGuard};

/// Compare `a` against `b` requiring identical types throughout.
///
/// Returns every difference found, in traversal order. An empty list means
/// the values are deeply equal.
pub fn strict_diff(a: &Value, b: &Value) -> Vec<Diff> {
    debug!(a = ?a.ty(), b = ?b.ty(), "strict diff");
    let mut walker = StrictWalker::new();
    walker.walk(a, b);
    let visited = walker.visited.len();
    let diffs = walker.rec.finish();
    debug!(diffs = diffs.len(), visited, "strict diff complete");
    diffs
}

struct StrictWalker {
    rec: Recorder,
    visited: VisitGuard<(PairKey, Type)>,
}

impl StrictWalker {
    fn new() -> Self {
        Self {
            rec: Recorder::new(),
            visited: VisitGuard::new(),
        }
    }

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

        let (ta, tb) = match (a.ty(), b.ty()) {
            (None, None) => return,
            (Some(ta), Some(tb)) => (ta, tb),
            _ => {
                self.rec.report(Cause::values(a, b));
                return;
            }
        };
        if ta != tb {
            self.rec.report(Cause::types(a, b));
            return;
        }

        if let Some(pair) = PairKey::of(a, b) {
            if !self.visited.first_visit((pair, ta.clone())) {
                trace!(ty = %ta, "pair already under comparison");
                return;
            }
        }

        match (Shape::of(a), a, b) {
            (Shape::Indexed, Value::Array(x), Value::Array(y)) => self.arrays(x, y),
            (Shape::Indexed, Value::Slice(x), Value::Slice(y)) => self.slices(a, b, x, y),
            (Shape::Fielded, Value::Struct(x), Value::Struct(y)) => self.structs(x, y),
            (Shape::Fielded | Shape::Associative, Value::Map(x), Value::Map(y)) => {
                self.maps(a, b, x, y)
            }
            (Shape::Pointer, Value::Ptr(x), Value::Ptr(y)) => self.pointers(a, b, x, y),
            (Shape::Pointer, Value::Interface(x), Value::Interface(y)) => match (x, y) {
                (None, None) => {}
                (Some(x), Some(y)) => self.descend(DYN_SEGMENT.to_string(), x, y),
                _ => self.rec.report(Cause::values(a, b)),
            },
            (Shape::Function, Value::Func(x), Value::Func(y)) => self.funcs(a, b, x, y),
            (Shape::Scalar, _, _) => self.scalars(a, b),
            _ => unreachable!("values of type {ta} have mismatched representations"),
        }
    }

    fn arrays(&mut self, x: &ArrayValue, y: &ArrayValue) {
        self.elements(x.items(), y.items());
    }

    fn elements(&mut self, xs: &[Value], ys: &[Value]) {
        for (i, (x, y)) in xs.iter().zip(ys).enumerate() {
            self.descend(index_segment(i), x, y);
        }
    }

    fn slices(&mut self, a: &Value, b: &Value, x: &SliceRef, y: &SliceRef) {
        if x.same_as(y) {
            return;
        }
        let (Some(xs), Some(ys)) = (x.items(), y.items()) else {
            self.rec.report(Cause::values(a, b));
            return;
        };
        if xs.len() != ys.len() {
            self.rec.report(Cause::lengths(a, b, xs.len(), ys.len()));
            return;
        }
        self.elements(&xs, &ys);
    }

    fn structs(&mut self, x: &StructValue, y: &StructValue) {
        let missing = Value::Invalid;
        for (name, fx) in x.fields() {
            let fy = y.field(name).unwrap_or(&missing);
            self.descend(field_segment(name), fx, fy);
        }
    }

    fn maps(&mut self, a: &Value, b: &Value, x: &MapRef, y: &MapRef) {
        if x.same_as(y) {
            return;
        }
        let (Some(xe), Some(ye)) = (x.entries(), y.entries()) else {
            self.rec.report(Cause::values(a, b));
            return;
        };
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

    fn pointers(&mut self, a: &Value, b: &Value, x: &PtrRef, y: &PtrRef) {
        if x.same_as(y) {
            return;
        }
        match (x.get(), y.get()) {
            (Some(x), Some(y)) => self.descend(DEREF_SEGMENT.to_string(), &x, &y),
            (None, None) => {}
            _ => self.rec.report(Cause::values(a, b)),
        }
    }

    fn funcs(&mut self, a: &Value, b: &Value, x: &FuncRef, y: &FuncRef) {
        match (x.addr(), y.addr()) {
            (None, None) => {}
            (Some(_), Some(_)) => self.rec.report(Cause::funcs(a, b)),
            _ => self.rec.report(Cause::values(a, b)),
        }
    }

    fn scalars(&mut self, a: &Value, b: &Value) {
        if a.comparable_key() != b.comparable_key() {
            self.rec.report(Cause::values(&a.canonical(), &b.canonical()));
        }
    }
}

/// Whether the entry found on the other side counts as present. A zero
/// value there stands in for "not found".
pub(crate) fn present(other: &Value) -> bool {
    !other.is_zero()
}
