mod helpers;

use jnrrd::{
    ByteOrder, DataArray, Encoding, ExtensionTree, Path, PathSegment, ValueNode, WriteOptions,
    read_from_bytes, write_to_vec,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

use helpers::{compiled_encodings, header_of};

fn identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_-]{0,7}"
}

fn segment() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        identifier().prop_map(PathSegment::Field),
        (0usize..1000).prop_map(PathSegment::Index),
    ]
}

/// Nested object keys, including ones that are not plain path fields.
fn object_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z]{1,5}",
        1 => "[a-z.:\\[\\]0-9]{0,4}",
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec((object_key(), inner), 0..5)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn sized_values() -> impl Strategy<Value = (Vec<usize>, Vec<i32>)> {
    prop::collection::vec(1usize..5, 1..4).prop_flat_map(|sizes| {
        let count: usize = sizes.iter().product();
        (Just(sizes), prop::collection::vec(any::<i32>(), count))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn path_display_parses_back(
        first in identifier(),
        rest in prop::collection::vec(segment(), 0..6),
    ) {
        let mut text = first.clone();
        for segment in &rest {
            match segment {
                PathSegment::Field(name) => text.push_str(&format!(".{name}")),
                PathSegment::Index(index) => text.push_str(&format!("[{index}]")),
            }
        }
        let path = Path::parse(&text).expect("parse failed");
        prop_assert_eq!(path.to_string(), text);

        let mut expected = vec![PathSegment::Field(first)];
        expected.extend(rest);
        prop_assert_eq!(path.segments(), &expected[..]);
    }

    #[test]
    fn flatten_unflatten_fixed_point(
        entries in prop::collection::vec(("[a-z]{1,4}", "[a-z]{1,5}", json_value()), 1..6),
    ) {
        let mut tree = ExtensionTree::new();
        for (namespace, key, value) in entries {
            tree.set(&namespace, &Path::field(key), ValueNode::from(value));
        }
        let records = tree.to_records();
        let again = ExtensionTree::from_records(&records).expect("from_records failed");
        let twice = again.to_records();

        prop_assert_eq!(&tree, &again);
        prop_assert_eq!(records, twice);
    }

    #[test]
    fn binary_encodings_are_bit_exact((sizes, values) in sized_values()) {
        let array = DataArray::new(sizes, values).expect("new failed");
        for encoding in compiled_encodings() {
            for order in [ByteOrder::Little, ByteOrder::Big] {
                let options = WriteOptions::new(encoding).with_byte_order(order);
                let bytes = write_to_vec(&header_of(&[]), &array, &options).expect("write failed");
                let (_, back) = read_from_bytes(&bytes).expect("read failed");
                prop_assert_eq!(&back, &array);
            }
        }
    }

    #[test]
    fn ascii_keeps_finite_doubles(
        values in prop::collection::vec(any::<f64>().prop_filter("finite", |x| x.is_finite()), 1..20),
    ) {
        let array = DataArray::new(vec![values.len()], values).expect("new failed");
        let bytes = write_to_vec(&header_of(&[]), &array, &WriteOptions::new(Encoding::Ascii))
            .expect("write failed");
        let (_, back) = read_from_bytes(&bytes).expect("read failed");
        prop_assert_eq!(back, array);
    }
}
