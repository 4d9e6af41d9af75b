use serde_json::{Value, json};

use crate::extension::{merge::merge, path::Path, value::ValueMap};

fn merge_all(entries: &[(&str, Value)]) -> Value {
    let mut root = ValueMap::new();
    for (path, value) in entries {
        let path = Path::parse(path).expect("parse failed");
        merge(&mut root, &path, value.clone().into());
    }
    serde_json::to_value(&root).expect("to_value failed")
}

#[test]
fn nested_fields_create_objects() {
    let tree = merge_all(&[
        ("creator.name", json!("J. Doe")),
        ("creator.email", json!("j@doe.org")),
        ("license", json!("CC-BY")),
    ]);
    assert_eq!(
        tree,
        json!({"creator": {"name": "J. Doe", "email": "j@doe.org"}, "license": "CC-BY"})
    );
}

#[test]
fn sparse_index_pads_with_null() {
    let tree = merge_all(&[("a[2]", json!(7))]);
    assert_eq!(tree, json!({"a": [null, null, 7]}));

    let tree = merge_all(&[("a[2]", json!(7)), ("a[0]", json!(1))]);
    assert_eq!(tree, json!({"a": [1, null, 7]}));
}

#[test]
fn indexed_objects() {
    let tree = merge_all(&[
        ("channels[1].name", json!("green")),
        ("channels[0].name", json!("red")),
        ("channels[1].wavelength", json!(532)),
    ]);
    assert_eq!(
        tree,
        json!({"channels": [{"name": "red"}, {"name": "green", "wavelength": 532}]})
    );
}

#[test]
fn nested_indices() {
    let tree = merge_all(&[("m[1][2]", json!(5)), ("m[0][0]", json!(1))]);
    assert_eq!(tree, json!({"m": [[1], [null, null, 5]]}));
}

#[test]
fn siblings_survive() {
    let tree = merge_all(&[
        ("a", json!({"x": 1, "y": 2})),
        ("a.z", json!(3)),
        ("a.x", json!(10)),
    ]);
    assert_eq!(tree, json!({"a": {"x": 10, "y": 2, "z": 3}}));
}

#[test]
fn override_keeps_key_position() {
    let mut root = ValueMap::new();
    for (path, value) in [("first", json!(1)), ("second", json!(2)), ("first", json!(3))] {
        merge(&mut root, &Path::parse(path).expect("parse failed"), value.into());
    }
    let keys: Vec<&str> = root.keys().map(String::as_str).collect();
    assert_eq!(keys, ["first", "second"]);
    assert_eq!(root["first"].as_u64(), Some(3));
}

#[test]
fn compound_value_replaces_then_merges() {
    let tree = merge_all(&[
        ("a.b", json!(1)),
        ("a", json!({"c": 2})),
        ("a.d", json!(3)),
    ]);
    assert_eq!(tree, json!({"a": {"c": 2, "d": 3}}));
}

#[test]
fn wrong_container_is_replaced() {
    let tree = merge_all(&[("a", json!(5)), ("a.b", json!(1))]);
    assert_eq!(tree, json!({"a": {"b": 1}}));

    let tree = merge_all(&[("a", json!({"k": 1})), ("a[1]", json!(true))]);
    assert_eq!(tree, json!({"a": [null, true]}));

    let tree = merge_all(&[("a[0]", json!(1)), ("a.b", json!(2))]);
    assert_eq!(tree, json!({"a": {"b": 2}}));
}
