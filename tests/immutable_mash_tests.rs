use immutable_mash::guard::MASH_WRITES;
use immutable_mash::{
    freeze, sym, CanonicalKey, ContainerKind, ImmutableMash, Mash, MashOp, MashWrite, Node, Outcome, Value,
};
use serde_json::json;
use std::sync::Arc;

fn attributes() -> ImmutableMash {
    ImmutableMash::new(json!({
        "top": {"second_level": "some value"},
        "list": ["x", "y"],
        "nested_list": [{"h": 1}],
    }))
    .unwrap()
}

fn every_write_op() -> Vec<MashOp<'static, Node>> {
    let other: Mash<Node> = [("top", freeze("replaced"))].into_iter().collect();
    vec![
        MashOp::Assign(CanonicalKey::from("top"), freeze(1)),
        MashOp::Clear,
        MashOp::SetDefault(freeze("fallback")),
        MashOp::SetDefaultGenerator(Arc::new(|_: &CanonicalKey| Node::NULL)),
        MashOp::Delete(CanonicalKey::from("top")),
        MashOp::DeleteIf(Box::new(|_: &CanonicalKey, _: &Node| true)),
        MashOp::KeepIf(Box::new(|_: &CanonicalKey, _: &Node| false)),
        MashOp::Merge(other.clone()),
        MashOp::Update(other.clone()),
        MashOp::Reject(Box::new(|_: &CanonicalKey, _: &Node| true)),
        MashOp::Replace(other),
        MashOp::Select(Box::new(|_: &CanonicalKey, _: &Node| false)),
        MashOp::Shift,
    ]
}

#[test]
fn test_end_to_end_scenario() {
    let root = attributes();

    let top = root.get("top").unwrap();
    assert!(matches!(top, Node::Mash(_)));
    assert_eq!(top.get("second_level").unwrap(), "some value");

    let first = root.get("nested_list").and_then(|l| l.get_index(0)).unwrap();
    assert!(matches!(first, Node::Mash(_)));
    assert_eq!(first.get("h").and_then(Node::as_i64), Some(1));

    let mut handle = root.clone();
    let err = handle.delete(CanonicalKey::from("top")).unwrap_err();
    assert_eq!(err.operation(), "delete");
    assert_eq!(err.container(), ContainerKind::Mash);
    assert!(root.contains_key("top"));

    let thawed = root.to_mutable_deep();
    match thawed.get("nested_list") {
        Some(Value::Array(items)) => assert!(matches!(items[0], Value::Map(_))),
        other => panic!("expected a plain array, got {other:?}"),
    }
    assert_eq!(root, thawed);
}

#[test]
fn test_text_and_symbol_lookups_agree() {
    let root = attributes();
    for key in ["top", "list", "nested_list", "missing"] {
        assert_eq!(root.get(key), root.get(&sym(key)));
        assert_eq!(root.contains_key(key), root.contains_key(&sym(key)));
    }
}

#[test]
fn test_symbol_keyed_input_reads_by_text() {
    let mut input: Mash<Value> = Mash::new();
    input.insert(sym("platform"), Value::from("linux"));
    input.insert("platform_family", Value::from("debian"));
    let root = ImmutableMash::from_mash(input);
    assert_eq!(root.get("platform").and_then(Node::as_str), Some("linux"));
    assert_eq!(root.get(&sym("platform_family")).and_then(Node::as_str), Some("debian"));
}

#[test]
fn test_colliding_keys_last_write_wins() {
    let root: ImmutableMash = vec![
        (CanonicalKey::from("port"), 80),
        (CanonicalKey::from(sym("port")), 8080),
    ]
    .into_iter()
    .collect();
    assert_eq!(root.len(), 1);
    assert_eq!(root.get("port").and_then(Node::as_i64), Some(8080));
}

#[test]
fn test_every_write_is_refused_without_change() {
    let root = attributes();
    let before = root.to_mutable_deep();
    let ops = every_write_op();
    assert_eq!(ops.len(), MASH_WRITES.len());

    let mut handle = root.clone();
    for op in ops {
        let name = op.name();
        assert!(MASH_WRITES.contains(&name));
        let err = handle.apply(op).unwrap_err();
        assert_eq!(err.operation(), name);
        assert_eq!(handle.to_mutable_deep(), before, "{name} changed the mash");
    }
    assert_eq!(root, before);
}

#[test]
fn test_every_write_succeeds_on_a_shallow_copy() {
    for op in every_write_op() {
        let name = op.name();
        let mut copy = attributes().dup_shallow();
        assert!(copy.apply(op).is_ok(), "{name} failed on a mutable copy");
    }
}

#[test]
fn test_shallow_dup_is_independent() {
    let root = attributes();
    let mut copy = root.dup_shallow();

    copy.insert("added", freeze(true));
    copy.remove("top");
    assert_eq!(copy.apply(MashOp::Shift).map(|o| matches!(o, Outcome::RemovedEntry(Some(_)))), Ok(true));

    assert_eq!(root.len(), 3);
    assert!(root.contains_key("top"));
    assert!(!root.contains_key("added"));

    // Nested values in the copy are the same frozen nodes.
    let nested = copy.get("nested_list").unwrap();
    assert!(nested.as_array().unwrap().ptr_eq(root.get("nested_list").unwrap().as_array().unwrap()));
}

#[test]
fn test_deep_copy_is_fully_mutable() {
    let root = attributes();
    let mut copy = root.to_mutable_deep();
    copy.get_mut("top")
        .and_then(Value::as_mash_mut)
        .unwrap()
        .insert("second_level", Value::from("changed"));
    copy.get_mut("list").and_then(Value::as_array_mut).unwrap().push(Value::from("z"));

    assert_eq!(root.dig(["top", "second_level"]).unwrap(), "some value");
    assert_eq!(root.get("list").and_then(Node::as_array).map(|a| a.len()), Some(2));
    assert_ne!(root, copy);
}

#[test]
fn test_equality_with_plain_mash_ignores_order() {
    let root = attributes();
    let reordered = Value::from(json!({
        "nested_list": [{"h": 1}],
        "list": ["x", "y"],
        "top": {"second_level": "some value"},
    }));
    assert_eq!(Node::Mash(root.clone()), reordered);
    assert_eq!(root, ImmutableMash::new(reordered).unwrap());
}

#[test]
fn test_json_output() {
    let root = attributes();
    assert_eq!(
        root.to_json(),
        json!({"top": {"second_level": "some value"}, "list": ["x", "y"], "nested_list": [{"h": 1}]})
    );
    assert_eq!(
        serde_json::to_string(&root).unwrap(),
        // serde_json objects iterate in key order, which fixed insertion order.
        r#"{"list":["x","y"],"nested_list":[{"h":1}],"top":{"second_level":"some value"}}"#
    );
}
