//! Structural ("deep") equality over [`Value`]s.
//!
//! Rules are applied in a fixed order, first match wins:
//! identity, NaN, null, kind mismatch, then one case per [`ValueKind`].
//! Inputs are only read; host elements are never traversed.

use crate::object::{Object, ObjectData, ObjectKind};
use crate::types::{Value, number_ops};
use rustc_hash::FxHashSet;

/// Discriminant the comparator dispatches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Primitive,
    Function,
    ArrayLike,
    RegExp,
    Date,
    HostElement,
    PlainObject,
    Error,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Object(o) => Self::of_object(&o.borrow()),
            _ => ValueKind::Primitive,
        }
    }

    fn of_object(data: &ObjectData) -> Self {
        match data.kind {
            ObjectKind::Ordinary => ValueKind::PlainObject,
            ObjectKind::Array(_) => ValueKind::ArrayLike,
            ObjectKind::Function(_) => ValueKind::Function,
            ObjectKind::RegExp(_) => ValueKind::RegExp,
            ObjectKind::Date(_) => ValueKind::Date,
            ObjectKind::Error(_) => ValueKind::Error,
            ObjectKind::Host(_) => ValueKind::HostElement,
        }
    }
}

/// Returns true when `a` and `b` are structurally equal.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    Comparison::default().values(a, b)
}

/// Per-call state: the object pairs currently being compared further up
/// the recursion. Meeting one of them again means the two graphs loop back
/// in step, so the pair is assumed equal there.
#[derive(Default)]
struct Comparison {
    in_progress: FxHashSet<(u64, u64)>,
}

impl Comparison {
    fn values(&mut self, a: &Value, b: &Value) -> bool {
        if a.strict_equals(b) {
            return true;
        }
        if a.is_nan() && b.is_nan() {
            return true;
        }
        let kind = ValueKind::of(a);
        if kind == ValueKind::Null || ValueKind::of(b) == ValueKind::Null {
            return false;
        }
        if kind != ValueKind::of(b) {
            return false;
        }
        let (Value::Object(x), Value::Object(y)) = (a, b) else {
            // Distinct primitives of the same kind that failed identity
            return false;
        };
        match kind {
            // Identity only, already checked above
            ValueKind::Error | ValueKind::HostElement | ValueKind::Function => false,
            ValueKind::RegExp => regexps(x, y),
            ValueKind::Date => dates(x, y),
            ValueKind::ArrayLike | ValueKind::PlainObject => self.composites(x, y, kind),
            ValueKind::Null | ValueKind::Primitive => false,
        }
    }

    fn composites(&mut self, x: &Object, y: &Object, kind: ValueKind) -> bool {
        let pair = (x.id(), y.id());
        if !self.in_progress.insert(pair) {
            return true;
        }
        let (dx, dy) = (x.borrow(), y.borrow());
        let equal = match kind {
            ValueKind::ArrayLike => self.arrays(&dx, &dy),
            _ => self.named_properties(&dx, &dy),
        };
        self.in_progress.remove(&pair);
        equal
    }

    fn arrays(&mut self, x: &ObjectData, y: &ObjectData) -> bool {
        let (ObjectKind::Array(ex), ObjectKind::Array(ey)) = (&x.kind, &y.kind) else {
            return false;
        };
        ex.len() == ey.len()
            && ex.iter().zip(ey).all(|(a, b)| self.values(a, b))
            && self.named_properties(x, y)
    }

    /// Same set of own enumerable named keys and pairwise-equal values.
    /// Presence matters: an absent key never matches an `undefined` one.
    fn named_properties(&mut self, x: &ObjectData, y: &ObjectData) -> bool {
        let keys: Vec<&str> = x.named_enumerable_keys().collect();
        if keys.len() != y.named_enumerable_keys().count() {
            return false;
        }
        keys.into_iter().all(|key| {
            let Some(other) = y.get_own_property(key).filter(|d| d.enumerable) else {
                return false;
            };
            match x.get_own_value(key) {
                Some(mine) => self.values(&mine, &other.value),
                None => false,
            }
        })
    }
}

fn regexps(x: &Object, y: &Object) -> bool {
    match (&x.borrow().kind, &y.borrow().kind) {
        (ObjectKind::RegExp(a), ObjectKind::RegExp(b)) => {
            a.source() == b.source() && a.flags() == b.flags()
        }
        _ => false,
    }
}

fn dates(x: &Object, y: &Object) -> bool {
    match (&x.borrow().kind, &y.borrow().kind) {
        (ObjectKind::Date(a), ObjectKind::Date(b)) => number_ops::same_value_zero(*a, *b),
        _ => false,
    }
}
