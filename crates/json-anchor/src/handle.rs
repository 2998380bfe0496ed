//! Shared ownership handles for decoded instances.
//!
//! Cyclic graphs mean an instance can be reachable from several places, and a
//! decode pass hands out references to instances whose fields are still being
//! filled in. Decoded instances therefore live behind [`Handle`]
//! (`Rc<RefCell<T>>`); the identity registry and pending patches hold them
//! type-erased as [`AnyHandle`]. Decoding is single-threaded per pass, so
//! `Rc`/`RefCell` rather than atomics.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A shared, mutable handle to a decoded instance.
pub type Handle<T> = Rc<RefCell<T>>;

/// Type-erased [`Handle`], as stored in the identity registry.
///
/// # Example
///
/// ```
/// use json_anchor::AnyHandle;
///
/// let h = AnyHandle::new(String::from("hello"));
/// let s = h.downcast::<String>().unwrap();
/// assert_eq!(&*s.borrow(), "hello");
/// assert!(h.downcast::<u32>().is_none());
/// ```
#[derive(Clone)]
pub struct AnyHandle {
    inner: Rc<dyn Any>,
    type_name: &'static str,
}

impl AnyHandle {
    /// Wrap a value in a fresh handle.
    pub fn new<T: 'static>(value: T) -> Self {
        Self::from_handle(Rc::new(RefCell::new(value)))
    }

    /// Erase an existing handle.
    pub fn from_handle<T: 'static>(handle: Handle<T>) -> Self {
        AnyHandle {
            inner: handle,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Recover the typed handle. `None` if the erased type is not `T`.
    pub fn downcast<T: 'static>(&self) -> Option<Handle<T>> {
        Rc::clone(&self.inner).downcast::<RefCell<T>>().ok()
    }

    /// Name of the erased type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether two erased handles point at the same allocation.
    pub fn ptr_eq(&self, other: &AnyHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for AnyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyHandle")
            .field("type_name", &self.type_name)
            .finish()
    }
}
