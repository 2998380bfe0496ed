//! The identity-tagged decoder.
//!
//! A decode pass walks the document top-down. Entering an object node it
//! determines the node's identity tag, constructs an instance from the fields
//! that are immediately available (scalars and references to tags already in
//! the registry), registers the instance under its tag, and only then recurses
//! into the remaining container fields. A reference to a tag that is not yet
//! registered becomes a pending patch; patches are applied in recorded order
//! once the root node has been fully walked. Forward references resolve
//! because every instance is registered before its own fields are complete.
//!
//! One pass owns one registry and one patch list; nothing is shared across
//! concurrent decode calls.

use std::collections::HashMap;

use json_anchor_doc::DocNode;
use serde_json::Value;

use crate::construct::{construct, set_field, FactorySet, Strategy};
use crate::descriptor::{Bind, Binding, FieldKind, FieldSpec};
use crate::error::{BindError, ConstructionError, DecodeError};
use crate::field::{FieldMap, FieldValue};
use crate::handle::{AnyHandle, Handle};

/// Configuration for a [`Decoder`].
///
/// # Example
///
/// ```
/// use json_anchor::{DecodeOptions, Strategy};
///
/// let options = DecodeOptions::new()
///     .identity_field("$anchor")
///     .preferred_strategy(Strategy::ZeroArgSetters)
///     .strict_unresolved(false);
/// ```
#[derive(Clone)]
pub struct DecodeOptions {
    identity_field: String,
    preferred_strategy: Strategy,
    strict_unresolved: bool,
    factories: FactorySet,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            identity_field: "@id".to_string(),
            preferred_strategy: Strategy::default(),
            strict_unresolved: true,
            factories: FactorySet::default(),
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document key carrying identity tags. Default `"@id"`.
    pub fn identity_field(mut self, name: impl Into<String>) -> Self {
        self.identity_field = name.into();
        self
    }

    /// Construction strategy to try first. Default
    /// [`Strategy::DesignatedFields`].
    pub fn preferred_strategy(mut self, strategy: Strategy) -> Self {
        self.preferred_strategy = strategy;
        self
    }

    /// When `true` (the default), any reference still unresolved when the
    /// pass ends is fatal. When `false`, the affected field keeps its
    /// default value.
    pub fn strict_unresolved(mut self, strict: bool) -> Self {
        self.strict_unresolved = strict;
        self
    }

    /// Register a custom factory for `T`, consulted by the
    /// [`Strategy::Factory`] construction path.
    pub fn with_factory<T, F>(mut self, factory: F) -> Self
    where
        T: Bind,
        F: Fn(&FieldMap) -> Result<Handle<T>, ConstructionError> + 'static,
    {
        self.factories.register::<T, _>(factory);
        self
    }
}

/// Decodes documents into linked object graphs.
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    pub fn new(options: DecodeOptions) -> Self {
        Decoder { options }
    }

    /// Decode `doc` into an instance graph rooted at `T`.
    ///
    /// On error no partial graph is returned.
    pub fn decode<T: Bind>(&self, doc: &DocNode) -> Result<Handle<T>, DecodeError> {
        if !doc.is_object() {
            return Err(DecodeError::ExpectedObject);
        }
        let mut pass = Pass::new(&self.options);
        let root = pass.decode_object(doc, T::binding())?;
        pass.apply_patches()?;
        root.downcast::<T>().ok_or(DecodeError::WrongHandleType {
            type_name: T::binding().type_name,
        })
    }
}

/// Decode with default options.
///
/// # Example
///
/// See the crate-level documentation for a cyclic-graph walkthrough.
pub fn decode<T: Bind>(doc: &DocNode) -> Result<Handle<T>, DecodeError> {
    Decoder::new(DecodeOptions::default()).decode(doc)
}

/// A deferred field assignment awaiting a forward reference.
struct PendingPatch {
    target: AnyHandle,
    binding: &'static Binding,
    field: &'static str,
    tag: u64,
}

/// State owned by a single decode call.
struct Pass<'a> {
    options: &'a DecodeOptions,
    /// Identity registry: tag to live (possibly incomplete) instance.
    /// Entries are inserted exactly once and never removed during the pass.
    registry: HashMap<u64, AnyHandle>,
    patches: Vec<PendingPatch>,
    /// Next candidate for implicit tag assignment, in document order.
    next_implicit: u64,
}

impl<'a> Pass<'a> {
    fn new(options: &'a DecodeOptions) -> Self {
        Pass {
            options,
            registry: HashMap::new(),
            patches: Vec::new(),
            next_implicit: 1,
        }
    }

    /// Decode one object node against `binding` and return its handle.
    fn decode_object(
        &mut self,
        node: &DocNode,
        binding: &'static Binding,
    ) -> Result<AnyHandle, DecodeError> {
        if !node.is_object() {
            return Err(DecodeError::ExpectedObject);
        }

        let explicit = node.get(&self.options.identity_field).is_some();
        let tag = self.node_tag(node)?;

        if let Some(existing) = self.registry.get(&tag) {
            // A node carrying only the identity field is a pure reference to
            // the existing instance; carrying data fields as well means the
            // document defines the same tag twice.
            if explicit && node.fields().len() == 1 {
                return Ok(existing.clone());
            }
            return Err(DecodeError::DuplicateTag { tag });
        }

        // Partition fields in document order; implicit tags for nested
        // objects follow that order. Unknown keys are ignored — the
        // descriptor is the authority. Nothing here recurses, so the
        // instance below is registered before any child object is visited.
        let mut available = FieldMap::new();
        let mut forward: Vec<(&'static str, u64)> = Vec::new();
        let mut deferred: Vec<(&'static FieldSpec, &DocNode)> = Vec::new();

        for (key, value) in node.fields() {
            if *key == self.options.identity_field {
                continue;
            }
            let Some(spec) = binding.field(key) else {
                continue;
            };
            match &spec.kind {
                FieldKind::Scalar => match value {
                    DocNode::Scalar(v) => {
                        available.insert(spec.name.to_string(), FieldValue::Scalar(v.clone()));
                    }
                    _ => {
                        return Err(DecodeError::TypeMismatch {
                            field: spec.name.to_string(),
                            expected: "a scalar",
                        })
                    }
                },
                FieldKind::Object(_) => match value {
                    DocNode::Scalar(Value::Null) => {}
                    DocNode::Scalar(_) => {
                        let referenced = value.as_u64().ok_or_else(|| DecodeError::TypeMismatch {
                            field: spec.name.to_string(),
                            expected: "an object or an unsigned integer tag",
                        })?;
                        match self.registry.get(&referenced) {
                            Some(resolved) => {
                                available.insert(
                                    spec.name.to_string(),
                                    FieldValue::Handle(resolved.clone()),
                                );
                            }
                            None => forward.push((spec.name, referenced)),
                        }
                    }
                    DocNode::Object(_) => deferred.push((spec, value)),
                    DocNode::Array(_) => {
                        return Err(DecodeError::TypeMismatch {
                            field: spec.name.to_string(),
                            expected: "an object or an unsigned integer tag",
                        })
                    }
                },
                FieldKind::Array(_) => match value {
                    DocNode::Scalar(Value::Null) => {}
                    DocNode::Array(_) => deferred.push((spec, value)),
                    _ => {
                        return Err(DecodeError::TypeMismatch {
                            field: spec.name.to_string(),
                            expected: "an array",
                        })
                    }
                },
            }
        }

        let handle = construct(
            binding,
            &available,
            self.options.preferred_strategy,
            &self.options.factories,
        )?;

        // Register before recursing; this is what lets descendants refer
        // back to the instance while its fields are still incomplete.
        self.registry.insert(tag, handle.clone());

        for (field, referenced) in forward {
            self.patches.push(PendingPatch {
                target: handle.clone(),
                binding,
                field,
                tag: referenced,
            });
        }

        for (spec, value) in deferred {
            let decoded = match &spec.kind {
                FieldKind::Object(thunk) => {
                    FieldValue::Handle(self.decode_object(value, thunk())?)
                }
                FieldKind::Array(_) => self.decode_element(value, &spec.kind, spec.name)?,
                FieldKind::Scalar => unreachable!("scalars are never deferred"),
            };
            set_field(binding, &handle, spec.name, decoded).map_err(DecodeError::Bind)?;
        }

        Ok(handle)
    }

    /// Decode an array element (or the array itself) against its kind.
    ///
    /// Elements cannot be patched individually, so a reference inside an
    /// array must point at an already-registered tag.
    fn decode_element(
        &mut self,
        node: &DocNode,
        kind: &FieldKind,
        field: &str,
    ) -> Result<FieldValue, DecodeError> {
        match kind {
            FieldKind::Scalar => match node {
                DocNode::Scalar(v) => Ok(FieldValue::Scalar(v.clone())),
                _ => Err(DecodeError::TypeMismatch {
                    field: field.to_string(),
                    expected: "a scalar element",
                }),
            },
            FieldKind::Object(thunk) => match node {
                DocNode::Object(_) => {
                    Ok(FieldValue::Handle(self.decode_object(node, thunk())?))
                }
                DocNode::Scalar(_) => {
                    let tag = node.as_u64().ok_or_else(|| DecodeError::TypeMismatch {
                        field: field.to_string(),
                        expected: "an object or an unsigned integer tag",
                    })?;
                    let resolved = self
                        .registry
                        .get(&tag)
                        .ok_or(DecodeError::UnresolvedReference { tag })?;
                    Ok(FieldValue::Handle(resolved.clone()))
                }
                DocNode::Array(_) => Err(DecodeError::TypeMismatch {
                    field: field.to_string(),
                    expected: "an object or an unsigned integer tag",
                }),
            },
            FieldKind::Array(element) => match node {
                DocNode::Array(items) => {
                    let decoded = items
                        .iter()
                        .map(|item| self.decode_element(item, element, field))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(FieldValue::List(decoded))
                }
                _ => Err(DecodeError::TypeMismatch {
                    field: field.to_string(),
                    expected: "an array",
                }),
            },
        }
    }

    /// The node's explicit tag, or a fresh implicit one in document order.
    fn node_tag(&mut self, node: &DocNode) -> Result<u64, DecodeError> {
        match node.get(&self.options.identity_field) {
            Some(tag_node) => tag_node.as_u64().ok_or_else(|| DecodeError::TypeMismatch {
                field: self.options.identity_field.clone(),
                expected: "an unsigned integer tag",
            }),
            None => {
                // Implicit tags share the explicit namespace; skip values
                // already claimed earlier in the pass.
                while self.registry.contains_key(&self.next_implicit) {
                    self.next_implicit += 1;
                }
                let tag = self.next_implicit;
                self.next_implicit += 1;
                Ok(tag)
            }
        }
    }

    /// Apply pending patches in recorded order.
    fn apply_patches(&mut self) -> Result<(), DecodeError> {
        let patches = std::mem::take(&mut self.patches);
        for patch in patches {
            let Some(source) = self.registry.get(&patch.tag) else {
                if self.options.strict_unresolved {
                    return Err(DecodeError::UnresolvedReference { tag: patch.tag });
                }
                continue;
            };
            let result = set_field(
                patch.binding,
                &patch.target,
                patch.field,
                FieldValue::Handle(source.clone()),
            );
            match result {
                Ok(()) => {}
                Err(err @ BindError::ImmutableUnresolvedField { .. }) => {
                    // Fatal for the field either way; fatal for the pass
                    // only under strict resolution.
                    if self.options.strict_unresolved {
                        return Err(err.into());
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}
