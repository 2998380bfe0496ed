//! Derived values materialized at construction time are only guaranteed on
//! the construction path that computes them. The zero-argument path skips
//! that work, and later setters do not refresh it — a documented limitation
//! of deferred binding, asserted here explicitly.

use json_anchor::{
    AnyHandle, Bind, BindError, Binding, BindingCell, DecodeOptions, Decoder, FieldMapExt,
    FieldSpec, Strategy,
};
use json_anchor_doc::DocNode;
use serde_json::json;

#[derive(Debug, Default)]
struct Profile {
    name: String,
    /// Derived from `name` by the designated-fields constructor only.
    greeting: Option<String>,
}

impl Bind for Profile {
    fn binding() -> &'static Binding {
        static CELL: BindingCell = BindingCell::new();
        CELL.get_or_init("Profile", || {
            Binding::new::<Profile>("Profile", vec![FieldSpec::scalar("name")])
                .with_from_fields(|fields| {
                    let name = fields.string("name").unwrap_or_default();
                    Ok(AnyHandle::new(Profile {
                        greeting: Some(format!("hello {name}")),
                        name,
                    }))
                })
                .with_empty(|| AnyHandle::new(Profile::default()))
                .with_set_field(|handle, name, value| {
                    let profile = handle
                        .downcast::<Profile>()
                        .ok_or(BindError::WrongTarget { type_name: "Profile" })?;
                    match name {
                        // Deliberately does not recompute `greeting`.
                        "name" => {
                            let text = value
                                .as_scalar()
                                .and_then(|v| v.as_str())
                                .ok_or(BindError::ValueType {
                                    type_name: "Profile",
                                    field: name.to_string(),
                                    expected: "string",
                                })?;
                            profile.borrow_mut().name = text.to_string();
                            Ok(())
                        }
                        other => Err(BindError::UnknownField {
                            type_name: "Profile",
                            field: other.to_string(),
                        }),
                    }
                })
        })
    }
}

#[test]
fn designated_path_materializes_the_derived_field() {
    let doc = DocNode::from(json!({"@id": 1, "name": "alpha"}));
    let options = DecodeOptions::new().preferred_strategy(Strategy::DesignatedFields);
    let profile = Decoder::new(options).decode::<Profile>(&doc).unwrap();

    assert_eq!(profile.borrow().name, "alpha");
    assert_eq!(profile.borrow().greeting.as_deref(), Some("hello alpha"));
}

#[test]
fn zero_arg_path_leaves_the_derived_field_absent() {
    let doc = DocNode::from(json!({"@id": 1, "name": "beta"}));
    let options = DecodeOptions::new().preferred_strategy(Strategy::ZeroArgSetters);
    let profile = Decoder::new(options).decode::<Profile>(&doc).unwrap();

    // The directly-decoded field arrived through the setter...
    assert_eq!(profile.borrow().name, "beta");
    // ...but the derived value was never computed. This absence is the
    // expected behavior, not a defect to paper over.
    assert_eq!(profile.borrow().greeting, None);
}

#[test]
fn later_mutation_does_not_refresh_the_derived_field() {
    let doc = DocNode::from(json!({"@id": 1, "name": "gamma"}));
    let options = DecodeOptions::new().preferred_strategy(Strategy::DesignatedFields);
    let profile = Decoder::new(options).decode::<Profile>(&doc).unwrap();

    profile.borrow_mut().name = "delta".to_string();
    assert_eq!(profile.borrow().greeting.as_deref(), Some("hello gamma"));
}
