//! The deferred-binding constructor: three construction strategies, tried in
//! a configurable order.
//!
//! A strategy the type does not expose is skipped; a strategy that runs and
//! fails surfaces its [`ConstructionError`] immediately. There is no silent
//! fallback past a failure and no retry — constructors may have side effects
//! and are assumed non-idempotent.

use std::any::TypeId;
use std::collections::HashMap;
use std::rc::Rc;

use crate::descriptor::{Bind, Binding};
use crate::error::{BindError, ConstructionError, DecodeError};
use crate::field::{FieldMap, FieldValue};
use crate::handle::{AnyHandle, Handle};

/// Which construction path to try first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Designated-fields constructor; absent parameters take zero-value
    /// defaults.
    #[default]
    DesignatedFields,
    /// Zero-argument constructor, then setters for the known fields.
    ZeroArgSetters,
    /// A factory registered for the type, given the raw field map.
    Factory,
}

/// The preferred strategy moves to the front; the rest keep their
/// designated / zero-arg / factory order.
pub(crate) fn strategy_order(preferred: Strategy) -> [Strategy; 3] {
    use Strategy::*;
    match preferred {
        DesignatedFields => [DesignatedFields, ZeroArgSetters, Factory],
        ZeroArgSetters => [ZeroArgSetters, DesignatedFields, Factory],
        Factory => [Factory, DesignatedFields, ZeroArgSetters],
    }
}

/// A custom construction function over the raw field map.
pub type FactoryFn = Rc<dyn Fn(&FieldMap) -> Result<AnyHandle, ConstructionError>>;

/// Per-type factory registrations.
#[derive(Default, Clone)]
pub(crate) struct FactorySet {
    by_type: HashMap<TypeId, FactoryFn>,
}

impl FactorySet {
    pub(crate) fn register<T, F>(&mut self, factory: F)
    where
        T: Bind,
        F: Fn(&FieldMap) -> Result<Handle<T>, ConstructionError> + 'static,
    {
        let erased: FactoryFn = Rc::new(move |fields| factory(fields).map(AnyHandle::from_handle));
        self.by_type.insert(TypeId::of::<T>(), erased);
    }

    fn get(&self, type_id: TypeId) -> Option<&FactoryFn> {
        self.by_type.get(&type_id)
    }
}

/// Produce an instance of the bound type from the fields available at
/// registration time. First applicable and successful strategy wins.
pub(crate) fn construct(
    binding: &'static Binding,
    available: &FieldMap,
    preferred: Strategy,
    factories: &FactorySet,
) -> Result<AnyHandle, DecodeError> {
    for strategy in strategy_order(preferred) {
        match strategy {
            Strategy::DesignatedFields => {
                if let Some(from_fields) = binding.from_fields {
                    return Ok(from_fields(available)?);
                }
            }
            Strategy::ZeroArgSetters => {
                // Needs a setter as well when fields are already known;
                // otherwise those values would be silently lost.
                let Some(empty) = binding.empty else { continue };
                if binding.set_field.is_none() && !available.is_empty() {
                    continue;
                }
                let handle = empty();
                if let Some(set_field) = binding.set_field {
                    for (name, value) in available {
                        set_field(&handle, name, value.clone()).map_err(DecodeError::Bind)?;
                    }
                }
                return Ok(handle);
            }
            Strategy::Factory => {
                if let Some(factory) = factories.get(binding.type_id) {
                    return Ok(factory(available)?);
                }
            }
        }
    }
    Err(ConstructionError::NoStrategy {
        type_name: binding.type_name,
    }
    .into())
}

/// Apply one named value to an already-constructed instance.
pub(crate) fn set_field(
    binding: &'static Binding,
    target: &AnyHandle,
    field: &str,
    value: FieldValue,
) -> Result<(), BindError> {
    let Some(setter) = binding.set_field else {
        return Err(BindError::ImmutableUnresolvedField {
            type_name: binding.type_name,
            field: field.to_string(),
        });
    };
    setter(target, field, value)
}
