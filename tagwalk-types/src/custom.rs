//! Object-safe view of caller-defined domain values.

use std::any::Any;
use std::fmt;

/// A domain value stored behind [`Value::Custom`](crate::Value::Custom).
///
/// Implemented automatically for every `'static` type that is `Debug` and
/// `PartialEq`, so callers never implement it by hand. Types that cannot
/// derive `PartialEq` (compiled patterns, handles) should be wrapped in a
/// newtype that compares by a stable key.
pub trait CustomValue: Any + fmt::Debug {
    /// Upcasts to `Any` for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// The Rust type name, used in diagnostics for unsupported values.
    fn type_name(&self) -> &'static str;

    /// Structural equality against another custom value of any type.
    fn dyn_eq(&self, other: &dyn CustomValue) -> bool;
}

impl<T> CustomValue for T
where
    T: Any + fmt::Debug + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn dyn_eq(&self, other: &dyn CustomValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}
