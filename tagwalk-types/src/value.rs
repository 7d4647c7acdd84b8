//! The in-memory value graph.
//!
//! Scalars are plain data. Lists, maps and custom values live behind `Rc`,
//! so cloning a [`Value`] clones a handle: two clones share identity and
//! mutations through one are visible through the other. That sharing is
//! what the engine preserves across a round-trip.

use crate::{CustomValue, Fields};
use serde_json::Number;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Shared handle to an ordered sequence.
pub type ListRef = Rc<RefCell<Vec<Value>>>;

/// Shared handle to an insertion-ordered mapping.
pub type MapRef = Rc<RefCell<Fields>>;

/// Shared handle to a caller-defined domain value.
pub type CustomRef = Rc<dyn CustomValue>;

/// Identity of a container within a live graph.
///
/// Derived from the `Rc` allocation address, so it is only meaningful while
/// the value it was taken from is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(usize);

/// A node in an in-memory value graph.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(ListRef),
    Map(MapRef),
    Custom(CustomRef),
}

impl Value {
    /// Creates a list from an iterator of values.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// Creates a map from `(key, value)` pairs, keeping their order.
    pub fn map<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Rc::new(RefCell::new(fields.into_iter().collect())))
    }

    /// Wraps a domain value.
    pub fn custom<T: CustomValue>(value: T) -> Self {
        Value::Custom(Rc::new(value))
    }

    /// Returns `true` for null, booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    }

    /// Identity of a list, map or custom value; `None` for scalars.
    pub fn identity(&self) -> Option<Identity> {
        let addr = match self {
            Value::List(rc) => Rc::as_ptr(rc) as *const () as usize,
            Value::Map(rc) => Rc::as_ptr(rc) as *const () as usize,
            Value::Custom(rc) => Rc::as_ptr(rc) as *const () as usize,
            _ => return None,
        };
        Some(Identity(addr))
    }

    /// Returns `true` when both values are the same container.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(rc) => Some(rc),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(rc) => Some(rc),
            _ => None,
        }
    }

    /// Downcasts a custom value to its concrete type.
    pub fn as_custom<T: CustomValue>(&self) -> Option<&T> {
        match self {
            Value::Custom(rc) => (**rc).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Looks up a map field, returning a handle to its value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_map()?.borrow().get(key).cloned()
    }

    /// Returns a handle to the list element at `index`.
    pub fn at(&self, index: usize) -> Option<Value> {
        self.as_list()?.borrow().get(index).cloned()
    }

    /// Sets a map field. Returns `false` if `self` is not a map.
    pub fn set(&self, key: impl Into<String>, value: Value) -> bool {
        match self {
            Value::Map(rc) => {
                rc.borrow_mut().insert(key, value);
                true
            }
            _ => false,
        }
    }

    /// Appends to a list. Returns `false` if `self` is not a list.
    pub fn push(&self, value: Value) -> bool {
        match self {
            Value::List(rc) => {
                rc.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Number of elements in a list or fields in a map.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(rc) => Some(rc.borrow().len()),
            Value::Map(rc) => Some(rc.borrow().len()),
            _ => None,
        }
    }

    /// Structural comparison that terminates on cyclic graphs.
    ///
    /// A pair of containers already under comparison is assumed equal, so
    /// two cycles of the same shape compare equal.
    fn structural_eq(&self, other: &Value, seen: &mut HashSet<(Identity, Identity)>) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => Rc::ptr_eq(a, b) || (**a).dyn_eq(&**b),
            (Value::List(a), Value::List(b)) => {
                if self.ptr_eq(other) || !self.mark_seen(other, seen) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| x.structural_eq(y, seen))
            }
            (Value::Map(a), Value::Map(b)) => {
                if self.ptr_eq(other) || !self.mark_seen(other, seen) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va.structural_eq(vb, seen))
            }
            _ => false,
        }
    }

    /// Records the pair; `false` if it was already present.
    fn mark_seen(&self, other: &Value, seen: &mut HashSet<(Identity, Identity)>) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => seen.insert((a, b)),
            _ => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other, &mut HashSet::new())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

/// Fails for NaN and the infinities, which have no portable form.
impl TryFrom<f64> for Value {
    type Error = crate::Error;

    fn try_from(n: f64) -> crate::Result<Self> {
        Number::from_f64(n)
            .map(Value::Number)
            .ok_or(crate::Error::NonFiniteNumber(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

thread_local! {
    /// Containers currently being formatted on this thread.
    static DEBUG_PATH: RefCell<Vec<Identity>> = const { RefCell::new(Vec::new()) };
}

/// Prints `<cycle>` instead of re-entering a container already on the
/// formatting path. Custom values are tracked too, since their own `Debug`
/// may print the graph they belong to.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(identity) = self.identity() else {
            return match self {
                Value::Bool(b) => write!(f, "{b}"),
                Value::Number(n) => write!(f, "{n}"),
                Value::String(s) => write!(f, "{s:?}"),
                _ => f.write_str("null"),
            };
        };
        if DEBUG_PATH.with(|path| path.borrow().contains(&identity)) {
            return f.write_str("<cycle>");
        }

        DEBUG_PATH.with(|path| path.borrow_mut().push(identity));
        let result = match self {
            Value::List(items) => f.debug_list().entries(items.borrow().iter()).finish(),
            Value::Map(fields) => f.debug_map().entries(fields.borrow().iter()).finish(),
            Value::Custom(custom) => fmt::Debug::fmt(&**custom, f),
            _ => Ok(()),
        };
        DEBUG_PATH.with(|path| path.borrow_mut().pop());
        result
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
