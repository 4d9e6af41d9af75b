//! Path-driven upsert into a value tree.
//!
//! Every container decision is made from the segment that follows the slot
//! being visited: a `Field` needs an object there, an `Index` needs an array.
//! A slot that does not hold the needed container (absent, null, scalar, or
//! the other container kind) is replaced by an empty one. Nothing outside
//! the addressed path is ever touched.

use crate::extension::{
    path::{Path, PathSegment},
    value::{ValueMap, ValueNode},
};

/// Assigns `value` at `path` below `root`, creating intermediate nodes and
/// padding arrays with null as needed.
pub fn merge(root: &mut ValueMap, path: &Path, value: ValueNode) {
    let (name, rest) = path.split_first();
    let slot = root.entry(name.to_string()).or_insert(ValueNode::NULL);
    assign(slot, rest, value);
}

fn assign(slot: &mut ValueNode, rest: &[PathSegment], value: ValueNode) {
    let Some((segment, tail)) = rest.split_first() else {
        *slot = value;
        return;
    };

    match segment {
        PathSegment::Field(name) => {
            let map = ensure_object(slot);
            let child = map.entry(name.clone()).or_insert(ValueNode::NULL);
            assign(child, tail, value);
        }
        PathSegment::Index(index) => {
            let items = ensure_array(slot);
            if items.len() <= *index {
                items.resize(*index + 1, ValueNode::NULL);
            }
            assign(&mut items[*index], tail, value);
        }
    }
}

#[inline]
fn ensure_object(slot: &mut ValueNode) -> &mut ValueMap {
    if !matches!(slot, ValueNode::Object(_)) {
        *slot = ValueNode::object();
    }
    match slot {
        ValueNode::Object(map) => map,
        _ => unreachable!(),
    }
}

#[inline]
fn ensure_array(slot: &mut ValueNode) -> &mut Vec<ValueNode> {
    if !matches!(slot, ValueNode::Array(_)) {
        *slot = ValueNode::Array(Vec::new());
    }
    match slot {
        ValueNode::Array(items) => items,
        _ => unreachable!(),
    }
}
