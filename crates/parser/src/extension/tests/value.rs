use serde_json::{Value, json};

use crate::extension::{
    path::Path,
    value::{Scalar, ValueNode},
};

#[test]
fn json_conversion_is_lossless() {
    let value = json!({
        "b": [1, -2, 3.5, null, true, "x"],
        "a": {"nested": {"deep": []}},
        "z": {}
    });
    let node = ValueNode::from(value.clone());
    assert_eq!(Value::from(&node), value);

    let keys: Vec<&str> = node
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["b", "a", "z"]);
}

#[test]
fn serde_goes_through_json_values() {
    let node: ValueNode = serde_json::from_str(r#"{"k": [1, {"x": "y"}]}"#).expect("from_str failed");
    assert_eq!(
        node.get_path(&Path::parse("k[1].x").expect("parse failed")).and_then(ValueNode::as_str),
        Some("y")
    );
    assert_eq!(
        serde_json::to_string(&node).expect("to_string failed"),
        r#"{"k":[1,{"x":"y"}]}"#
    );
}

#[test]
fn scalar_conversions() {
    assert_eq!(ValueNode::from(3usize).as_u64(), Some(3));
    assert_eq!(ValueNode::from(-3i64).as_i64(), Some(-3));
    assert_eq!(ValueNode::from(0.25).as_f64(), Some(0.25));
    assert!(ValueNode::from(f64::NAN).is_null());
    assert_eq!(ValueNode::from("s").as_str(), Some("s"));
    assert_eq!(ValueNode::from(true).as_bool(), Some(true));
    assert_eq!(ValueNode::default(), ValueNode::Scalar(Scalar::Null));
    assert_eq!(
        Value::from(ValueNode::from(vec![1u64, 2, 3])),
        json!([1, 2, 3])
    );
}

#[test]
fn lookups_on_wrong_kind_are_none() {
    let node = ValueNode::from(json!({"a": [1, 2]}));
    assert!(node.get_path(&Path::parse("a.b").expect("parse failed")).is_none());
    assert!(node.get_path(&Path::parse("a[5]").expect("parse failed")).is_none());
    assert!(node.get("a").and_then(|a| a.get("x")).is_none());
}
