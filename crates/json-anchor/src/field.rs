//! Field values and field maps — the currency between decoder and constructor.

use indexmap::IndexMap;
use serde_json::Value;

use crate::handle::{AnyHandle, Handle};

/// A decoded field value handed to a constructor or setter.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// A non-container JSON value.
    Scalar(Value),
    /// An ordered sequence of decoded values.
    List(Vec<FieldValue>),
    /// A reference to a decoded (possibly still incomplete) instance.
    Handle(AnyHandle),
}

impl FieldValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Typed view of a handle value. `None` for non-handles and for handles
    /// to some other type.
    pub fn handle<T: 'static>(&self) -> Option<Handle<T>> {
        match self {
            FieldValue::Handle(h) => h.downcast::<T>(),
            _ => None,
        }
    }
}

/// Known fields of an object under construction, in document order.
pub type FieldMap = IndexMap<String, FieldValue>;

/// Convenience accessors for [`FieldMap`], used by `Bind` implementations.
///
/// Absent fields read as `None`; designated-fields constructors turn that
/// into the type-appropriate zero value.
pub trait FieldMapExt {
    fn scalar(&self, name: &str) -> Option<&Value>;
    fn string(&self, name: &str) -> Option<String>;
    fn u64(&self, name: &str) -> Option<u64>;
    fn i64(&self, name: &str) -> Option<i64>;
    fn f64(&self, name: &str) -> Option<f64>;
    fn bool(&self, name: &str) -> Option<bool>;
    fn handle<T: 'static>(&self, name: &str) -> Option<Handle<T>>;
}

impl FieldMapExt for FieldMap {
    fn scalar(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(FieldValue::as_scalar)
    }

    fn string(&self, name: &str) -> Option<String> {
        self.scalar(name)?.as_str().map(str::to_string)
    }

    fn u64(&self, name: &str) -> Option<u64> {
        self.scalar(name)?.as_u64()
    }

    fn i64(&self, name: &str) -> Option<i64> {
        self.scalar(name)?.as_i64()
    }

    fn f64(&self, name: &str) -> Option<f64> {
        self.scalar(name)?.as_f64()
    }

    fn bool(&self, name: &str) -> Option<bool> {
        self.scalar(name)?.as_bool()
    }

    fn handle<T: 'static>(&self, name: &str) -> Option<Handle<T>> {
        self.get(name)?.handle::<T>()
    }
}
