//! Seeded properties: for acyclic documents the engine agrees with a naive
//! recursive decoder, and decoding twice yields structurally-equal but
//! reference-distinct graphs.

use std::rc::Rc;

use json_anchor::{
    decode, AnyHandle, Bind, BindError, Binding, BindingCell, FieldKind, FieldMapExt, FieldSpec,
    Handle,
};
use json_anchor_doc::DocNode;
use serde_json::Value;

#[derive(Debug, Default)]
struct Item {
    name: String,
    score: i64,
    tags: Vec<String>,
    child: Option<Handle<Item>>,
}

impl Bind for Item {
    fn binding() -> &'static Binding {
        static CELL: BindingCell = BindingCell::new();
        CELL.get_or_init("Item", || {
            Binding::new::<Item>(
                "Item",
                vec![
                    FieldSpec::scalar("name"),
                    FieldSpec::scalar("score"),
                    FieldSpec::array("tags", FieldKind::Scalar),
                    FieldSpec::object("child", Item::binding),
                ],
            )
            .with_from_fields(|fields| {
                Ok(AnyHandle::new(Item {
                    name: fields.string("name").unwrap_or_default(),
                    score: fields.i64("score").unwrap_or_default(),
                    tags: Vec::new(),
                    child: fields.handle::<Item>("child"),
                }))
            })
            .with_empty(|| AnyHandle::new(Item::default()))
            .with_set_field(|handle, name, value| {
                let item = handle
                    .downcast::<Item>()
                    .ok_or(BindError::WrongTarget { type_name: "Item" })?;
                match name {
                    "name" => {
                        let text = value
                            .as_scalar()
                            .and_then(|v| v.as_str())
                            .ok_or(value_type("name", "string"))?;
                        item.borrow_mut().name = text.to_string();
                        Ok(())
                    }
                    "score" => {
                        let n = value
                            .as_scalar()
                            .and_then(|v| v.as_i64())
                            .ok_or(value_type("score", "integer"))?;
                        item.borrow_mut().score = n;
                        Ok(())
                    }
                    "tags" => {
                        let items = value.as_list().ok_or(value_type("tags", "list"))?;
                        let tags = items
                            .iter()
                            .map(|v| {
                                v.as_scalar()
                                    .and_then(|s| s.as_str())
                                    .map(str::to_string)
                                    .ok_or(value_type("tags", "string element"))
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        item.borrow_mut().tags = tags;
                        Ok(())
                    }
                    "child" => {
                        item.borrow_mut().child = value.handle::<Item>();
                        Ok(())
                    }
                    other => Err(BindError::UnknownField {
                        type_name: "Item",
                        field: other.to_string(),
                    }),
                }
            })
        })
    }
}

fn value_type(field: &str, expected: &'static str) -> BindError {
    BindError::ValueType {
        type_name: "Item",
        field: field.to_string(),
        expected,
    }
}

// Reference decoder for acyclic documents: plain recursion, no registry.

#[derive(Debug, Default, PartialEq)]
struct NaiveItem {
    name: String,
    score: i64,
    tags: Vec<String>,
    child: Option<Box<NaiveItem>>,
}

fn naive_decode(value: &Value) -> NaiveItem {
    let obj = value.as_object().expect("generated docs are objects");
    NaiveItem {
        name: obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        score: obj.get("score").and_then(Value::as_i64).unwrap_or_default(),
        tags: obj
            .get("tags")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        child: obj.get("child").map(|c| Box::new(naive_decode(c))),
    }
}

fn graphs_agree(engine: &Handle<Item>, reference: &NaiveItem) -> bool {
    let item = engine.borrow();
    if item.name != reference.name || item.score != reference.score || item.tags != reference.tags {
        return false;
    }
    match (&item.child, &reference.child) {
        (None, None) => true,
        (Some(child), Some(naive_child)) => graphs_agree(child, naive_child),
        _ => false,
    }
}

#[test]
fn acyclic_documents_match_the_naive_reference_decoder() {
    for seed in seeds() {
        let value = random_item_doc(seed, 4);
        let reference = naive_decode(&value);
        let engine = decode::<Item>(&DocNode::from(value.clone())).expect("decode must succeed");
        assert!(
            graphs_agree(&engine, &reference),
            "engine disagrees with reference decoder, seed={seed}"
        );
    }
}

#[test]
fn decoding_the_same_document_twice_is_structurally_equal_but_distinct() {
    for seed in seeds() {
        let value = random_item_doc(seed, 4);
        let doc = DocNode::from(value);
        let first = decode::<Item>(&doc).expect("decode must succeed");
        let second = decode::<Item>(&doc).expect("decode must succeed");

        assert!(!Rc::ptr_eq(&first, &second), "roots must be distinct, seed={seed}");
        let reference = collect(&first);
        assert!(
            graphs_agree(&second, &reference),
            "second decode differs structurally, seed={seed}"
        );
        let first_child = first.borrow().child.clone();
        let second_child = second.borrow().child.clone();
        if let (Some(a), Some(b)) = (first_child, second_child) {
            assert!(!Rc::ptr_eq(&a, &b), "children must be distinct, seed={seed}");
        }
    }
}

fn collect(engine: &Handle<Item>) -> NaiveItem {
    let item = engine.borrow();
    NaiveItem {
        name: item.name.clone(),
        score: item.score,
        tags: item.tags.clone(),
        child: item.child.as_ref().map(|c| Box::new(collect(c))),
    }
}

// Deterministic generation, seeded LCG.

fn seeds() -> [u64; 16] {
    [
        0x5eed_c0de,
        0x0000_0001,
        0x0000_00ff,
        0x00c0_ffee,
        0x0123_4567_89ab_cdef,
        0x1111_2222_3333_4444,
        0x2222_3333_4444_5555,
        0x3333_4444_5555_6666,
        0x4444_5555_6666_7777,
        0x5555_6666_7777_8888,
        0x89ab_cdef_0123_4567,
        0xfedc_ba98_7654_3210,
        0x1357_9bdf_2468_ace0,
        0x0f0f_f0f0_55aa_aa55,
        0xa5a5_5a5a_dead_beef,
        0x0000_0000_0000_7001,
    ]
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn range(&mut self, n: u64) -> u64 {
        if n == 0 {
            0
        } else {
            self.next_u64() % n
        }
    }
}

fn random_item_doc(seed: u64, depth: usize) -> Value {
    let mut rng = Lcg::new(seed);
    random_item(&mut rng, depth)
}

fn random_item(rng: &mut Lcg, depth: usize) -> Value {
    let mut obj = serde_json::Map::new();
    if rng.range(4) != 0 {
        obj.insert(
            "name".to_string(),
            Value::String(format!("n{}", rng.range(1000))),
        );
    }
    if rng.range(4) != 0 {
        obj.insert(
            "score".to_string(),
            Value::Number(serde_json::Number::from((rng.range(200) as i64) - 100)),
        );
    }
    if rng.range(3) == 0 {
        let len = rng.range(5) as usize;
        let tags = (0..len)
            .map(|i| Value::String(format!("t{}-{}", i, rng.range(50))))
            .collect();
        obj.insert("tags".to_string(), Value::Array(tags));
    }
    if depth > 0 && rng.range(3) != 0 {
        obj.insert("child".to_string(), random_item(rng, depth - 1));
    }
    Value::Object(obj)
}
