//! Binding descriptors — compile-time registration of decodable types.
//!
//! A type participates in decoding by implementing [`Bind`], which exposes a
//! process-lifetime [`Binding`]: the ordered field list plus the construction
//! paths the type supports. Descriptors are computed once per type and are
//! read-only afterwards, so concurrent decode passes may share them.
//!
//! Cross-type field references use thunks (`fn() -> &'static Binding`) rather
//! than eager descriptor lookups, so mutually referential types never recurse
//! while their descriptors are being computed.

use std::any::TypeId;
use std::cell::RefCell;
use std::sync::OnceLock;

use crate::error::{BindError, ConstructionError};
use crate::field::{FieldMap, FieldValue};
use crate::handle::AnyHandle;

/// Deferred lookup of another type's binding.
pub type BindingThunk = fn() -> &'static Binding;

/// Designated-fields construction path: build an instance from whatever
/// named values are present, defaulting the rest.
pub type FromFieldsFn = fn(&FieldMap) -> Result<AnyHandle, ConstructionError>;

/// Zero-argument construction path.
pub type EmptyFn = fn() -> AnyHandle;

/// Post-construction field mutation path.
pub type SetFieldFn = fn(&AnyHandle, &str, FieldValue) -> Result<(), BindError>;

/// What shape of value a field holds.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A non-container JSON value.
    Scalar,
    /// A reference to another decodable type.
    Object(BindingThunk),
    /// An ordered sequence of the element kind.
    Array(Box<FieldKind>),
}

/// One entry of a type's ordered field list.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn scalar(name: &'static str) -> Self {
        FieldSpec {
            name,
            kind: FieldKind::Scalar,
        }
    }

    pub fn object(name: &'static str, binding: BindingThunk) -> Self {
        FieldSpec {
            name,
            kind: FieldKind::Object(binding),
        }
    }

    pub fn array(name: &'static str, element: FieldKind) -> Self {
        FieldSpec {
            name,
            kind: FieldKind::Array(Box::new(element)),
        }
    }
}

/// Per-type binding descriptor: field list plus construction paths.
///
/// Built once inside [`Bind::binding`] via [`BindingCell`]; stable for the
/// process lifetime.
#[derive(Debug, Clone)]
pub struct Binding {
    pub(crate) type_id: TypeId,
    pub type_name: &'static str,
    pub fields: Vec<FieldSpec>,
    pub from_fields: Option<FromFieldsFn>,
    pub empty: Option<EmptyFn>,
    pub set_field: Option<SetFieldFn>,
}

impl Binding {
    /// Start a descriptor for `T` with its ordered field list. Construction
    /// paths are attached with the `with_*` methods; a type with none of
    /// them cannot be constructed.
    pub fn new<T: 'static>(type_name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Binding {
            type_id: TypeId::of::<T>(),
            type_name,
            fields,
            from_fields: None,
            empty: None,
            set_field: None,
        }
    }

    pub fn with_from_fields(mut self, f: FromFieldsFn) -> Self {
        self.from_fields = Some(f);
        self
    }

    pub fn with_empty(mut self, f: EmptyFn) -> Self {
        self.empty = Some(f);
        self
    }

    pub fn with_set_field(mut self, f: SetFieldFn) -> Self {
        self.set_field = Some(f);
        self
    }

    /// Look up a field spec by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A type that can be decoded.
///
/// Implementations keep a `static` [`BindingCell`] and build their
/// [`Binding`] inside [`BindingCell::get_or_init`]. Fields referring to other
/// `Bind` types name the other type's `binding` function as a thunk; calling
/// it eagerly from inside the initializer is the reentrancy hazard the cell
/// guards against.
pub trait Bind: Sized + 'static {
    fn binding() -> &'static Binding;
}

thread_local! {
    // Type names whose descriptor computation is on the current call stack.
    static IN_PROGRESS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

/// Compute-once storage for a type's [`Binding`].
///
/// # Panics
///
/// Panics if the initializer for `type_name` re-enters itself on the same
/// thread — a `Bind` implementation calling another type's `binding()`
/// eagerly instead of passing it as a thunk. Without the guard such an
/// implementation would recurse forever.
pub struct BindingCell {
    slot: OnceLock<Binding>,
}

impl BindingCell {
    pub const fn new() -> Self {
        BindingCell {
            slot: OnceLock::new(),
        }
    }

    pub fn get_or_init(
        &'static self,
        type_name: &'static str,
        init: fn() -> Binding,
    ) -> &'static Binding {
        if let Some(binding) = self.slot.get() {
            return binding;
        }
        IN_PROGRESS.with(|stack| {
            if stack.borrow().contains(&type_name) {
                panic!(
                    "binding descriptor for `{type_name}` is computed reentrantly; \
                     refer to other types via thunks (`fn() -> &'static Binding`)"
                );
            }
            stack.borrow_mut().push(type_name);
        });
        let binding = self.slot.get_or_init(init);
        IN_PROGRESS.with(|stack| stack.borrow_mut().retain(|name| *name != type_name));
        binding
    }
}

impl Default for BindingCell {
    fn default() -> Self {
        Self::new()
    }
}
