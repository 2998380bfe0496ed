//! Error types for decoding and binding.

use thiserror::Error;

/// A construction strategy was applicable but failed while instantiating.
///
/// Propagated immediately; strategies are never retried and factory errors
/// are never swallowed by falling through to another strategy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("factory for `{type_name}` failed: {message}")]
    Factory {
        type_name: &'static str,
        message: String,
    },

    #[error("constructor for `{type_name}` failed: {message}")]
    Constructor {
        type_name: &'static str,
        message: String,
    },

    /// The type exposes none of the applicable construction paths.
    #[error("no construction strategy applies to `{type_name}`")]
    NoStrategy { type_name: &'static str },
}

/// A field-level binding failure raised by a type's setter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A value arriving after construction has no mutation path.
    #[error("field `{field}` of `{type_name}` cannot be set after construction")]
    ImmutableUnresolvedField {
        type_name: &'static str,
        field: String,
    },

    #[error("`{type_name}` has no field `{field}`")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    /// The setter received a value of the wrong shape or referent type.
    #[error("field `{field}` of `{type_name}` expected {expected}")]
    ValueType {
        type_name: &'static str,
        field: String,
        expected: &'static str,
    },

    /// The setter was handed an instance of some other type.
    #[error("setter for `{type_name}` received a foreign instance")]
    WrongTarget { type_name: &'static str },
}

/// A decode pass failed. No partial graph is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A tag was referenced but never defined anywhere in the document.
    #[error("unresolved reference: tag {tag} is never defined")]
    UnresolvedReference { tag: u64 },

    /// The same explicit tag defined two distinct objects in one pass.
    #[error("duplicate identity tag {tag}")]
    DuplicateTag { tag: u64 },

    #[error("expected an object node")]
    ExpectedObject,

    /// Node shape disagrees with the binding descriptor's field kind.
    #[error("type mismatch for field `{field}`: expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// A binding produced a handle of a type other than its own.
    #[error("binding for `{type_name}` produced a handle of the wrong type")]
    WrongHandleType { type_name: &'static str },

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Bind(#[from] BindError),
}
