//! json-anchor — identity-tagged document decoding with deferred binding.
//!
//! Turns a tree-structured document into a fully linked object graph, cycles
//! included. Any object node may carry an identity tag (by default the
//! `"@id"` key); other nodes refer to it by that tag. An instance is
//! registered under its tag *before* its own fields are complete, which is
//! what lets a descendant point back at an ancestor. References to tags that
//! have not been seen yet are recorded as pending patches and applied once
//! the whole document has been walked.
//!
//! Types opt in by implementing [`Bind`], declaring their fields and up to
//! three construction paths: a designated-fields constructor, a zero-argument
//! constructor plus setters, and a registered factory.
//!
//! # Example
//!
//! The classic two-object cycle: `Alpha` points at `Beta` and `Beta` points
//! back by tag.
//!
//! ```
//! use json_anchor::{
//!     decode, AnyHandle, Bind, BindError, Binding, BindingCell, FieldSpec, Handle,
//! };
//! use json_anchor_doc::DocNode;
//! use serde_json::json;
//! use std::rc::Rc;
//!
//! #[derive(Debug, Default)]
//! struct Alpha {
//!     beta: Option<Handle<Beta>>,
//! }
//!
//! #[derive(Debug, Default)]
//! struct Beta {
//!     alpha: Option<Handle<Alpha>>,
//! }
//!
//! impl Bind for Alpha {
//!     fn binding() -> &'static Binding {
//!         static CELL: BindingCell = BindingCell::new();
//!         CELL.get_or_init("Alpha", || {
//!             Binding::new::<Alpha>("Alpha", vec![FieldSpec::object("beta", Beta::binding)])
//!                 .with_empty(|| AnyHandle::new(Alpha::default()))
//!                 .with_set_field(|handle, name, value| {
//!                     let alpha = handle
//!                         .downcast::<Alpha>()
//!                         .ok_or(BindError::WrongTarget { type_name: "Alpha" })?;
//!                     match name {
//!                         "beta" => {
//!                             alpha.borrow_mut().beta = value.handle::<Beta>();
//!                             Ok(())
//!                         }
//!                         other => Err(BindError::UnknownField {
//!                             type_name: "Alpha",
//!                             field: other.to_string(),
//!                         }),
//!                     }
//!                 })
//!         })
//!     }
//! }
//!
//! impl Bind for Beta {
//!     fn binding() -> &'static Binding {
//!         static CELL: BindingCell = BindingCell::new();
//!         CELL.get_or_init("Beta", || {
//!             Binding::new::<Beta>("Beta", vec![FieldSpec::object("alpha", Alpha::binding)])
//!                 .with_empty(|| AnyHandle::new(Beta::default()))
//!                 .with_set_field(|handle, name, value| {
//!                     let beta = handle
//!                         .downcast::<Beta>()
//!                         .ok_or(BindError::WrongTarget { type_name: "Beta" })?;
//!                     match name {
//!                         "alpha" => {
//!                             beta.borrow_mut().alpha = value.handle::<Alpha>();
//!                             Ok(())
//!                         }
//!                         other => Err(BindError::UnknownField {
//!                             type_name: "Beta",
//!                             field: other.to_string(),
//!                         }),
//!                     }
//!                 })
//!         })
//!     }
//! }
//!
//! let doc = DocNode::from(json!({"@id": 1, "beta": {"@id": 2, "alpha": 1}}));
//! let alpha = decode::<Alpha>(&doc).unwrap();
//!
//! let beta = alpha.borrow().beta.clone().unwrap();
//! let back = beta.borrow().alpha.clone().unwrap();
//! assert!(Rc::ptr_eq(&alpha, &back));
//! ```

pub mod construct;
pub mod decode;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod handle;

pub use construct::{FactoryFn, Strategy};
pub use decode::{decode, DecodeOptions, Decoder};
pub use descriptor::{
    Bind, Binding, BindingCell, BindingThunk, EmptyFn, FieldKind, FieldSpec, FromFieldsFn,
    SetFieldFn,
};
pub use error::{BindError, ConstructionError, DecodeError};
pub use field::{FieldMap, FieldMapExt, FieldValue};
pub use handle::{AnyHandle, Handle};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
