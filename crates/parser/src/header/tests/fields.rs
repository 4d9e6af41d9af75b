use serde_json::{Value, json};

use crate::{
    data::{ByteOrder, ElementType, Encoding},
    error::JnrrdError,
    extension::Path,
    header::{Header, HeaderRecord},
};

fn header(entries: &[(&str, Value)]) -> Header {
    let records: Vec<HeaderRecord> = entries
        .iter()
        .map(|(key, value)| HeaderRecord::new(*key, value.clone()))
        .collect();
    Header::from_records(&records).expect("from_records failed")
}

#[test]
fn descriptor_from_core_fields() {
    let header = header(&[
        ("jnrrd", json!("0004")),
        ("type", json!("int16")),
        ("dimension", json!(3)),
        ("sizes", json!([4, 5, 6])),
        ("endian", json!("big")),
        ("encoding", json!("gz")),
    ]);
    let descriptor = header.descriptor().expect("descriptor failed");
    assert_eq!(descriptor.element_type, ElementType::Int16);
    assert_eq!(descriptor.byte_order, ByteOrder::Big);
    assert_eq!(descriptor.sizes, [4, 5, 6]);
    assert_eq!(header.encoding().expect("encoding failed"), Encoding::Gzip);
    assert_eq!(header.version(), Some("0004"));
}

#[test]
fn optional_fields_default() {
    let header = header(&[("type", json!("uint8"))]);
    assert_eq!(header.encoding().expect("encoding failed"), Encoding::Raw);
    assert_eq!(header.byte_order().expect("byte_order failed"), ByteOrder::Native);
    assert_eq!(header.data_file().expect("data_file failed"), None);
    assert_eq!(header.line_skip().expect("line_skip failed"), 0);
    assert_eq!(header.byte_skip().expect("byte_skip failed"), 0);
}

#[test]
fn missing_required_fields() {
    let missing = |h: Header| match h.descriptor() {
        Err(JnrrdError::MissingRequiredField(field)) => field,
        other => panic!("expected a missing field, got {other:?}"),
    };
    assert_eq!(missing(header(&[])), "type");
    assert_eq!(missing(header(&[("type", json!("uint8"))])), "dimension");
    assert_eq!(
        missing(header(&[("type", json!("uint8")), ("dimension", json!(1))])),
        "sizes"
    );
}

#[test]
fn invalid_core_fields() {
    let base = [("type", json!("uint8")), ("dimension", json!(2))];
    let invalid = |extra: (&str, Value)| {
        let mut entries = base.to_vec();
        entries.push(extra);
        match header(&entries).descriptor() {
            Err(JnrrdError::InvalidField { field, .. }) => field,
            other => panic!("expected an invalid field, got {other:?}"),
        }
    };
    assert_eq!(invalid(("sizes", json!([2]))), "sizes");
    assert_eq!(invalid(("sizes", json!([2, 0]))), "sizes");
    assert_eq!(invalid(("sizes", json!([2, -1]))), "sizes");
    assert_eq!(invalid(("sizes", json!("2 2"))), "sizes");
    assert_eq!(invalid(("endian", json!(1))), "endian");
    assert_eq!(invalid(("sizes", json!([4611686018427387904u64, 4]))), "sizes");
    assert_eq!(invalid(("sizes", json!([u64::MAX, 1]))), "sizes");

    let h = header(&[("type", json!(8))]);
    assert!(matches!(h.element_type(), Err(JnrrdError::InvalidField { field: "type", .. })));
    let h = header(&[("type", json!("uint9"))]);
    assert!(matches!(h.element_type(), Err(JnrrdError::UnknownElementType(_))));
    let h = header(&[
        ("type", json!("float64")),
        ("dimension", json!(1)),
        ("sizes", json!([usize::MAX / 4])),
    ]);
    assert!(matches!(h.descriptor(), Err(JnrrdError::InvalidField { field: "sizes", .. })));
    let h = header(&[("dimension", json!(0))]);
    assert!(matches!(h.dimension(), Err(JnrrdError::InvalidField { field: "dimension", .. })));
}

#[test]
fn extensions_and_serialization() {
    let mut header = header(&[
        ("type", json!("float32")),
        ("extensions", json!({"nifti": "https://example.org/nifti"})),
        ("nifti:intent_code", json!(1001)),
    ]);
    header.set_extension("nifti", &Path::parse("qform.code").expect("parse failed"), 1u64);

    let declared = header.declared_extensions().expect("no declarations");
    assert!(declared.contains_key("nifti"));
    assert_eq!(
        header
            .extension_value("nifti", &Path::parse("intent_code").expect("parse failed"))
            .and_then(|v| v.as_u64()),
        Some(1001)
    );
    assert!(header.extension("jnrrd").is_none());

    assert_eq!(
        serde_json::to_value(&header).expect("to_value failed"),
        json!({
            "jnrrd": {"type": "float32", "extensions": {"nifti": "https://example.org/nifti"}},
            "nifti": {"intent_code": 1001, "qform": {"code": 1}}
        })
    );
}

#[test]
fn set_keeps_position_and_remove_drops() {
    let mut header = header(&[("a", json!(1)), ("b", json!(2))]);
    header.set("a", 3u64);
    header.set("c", "x");
    assert_eq!(header.remove("b").and_then(|v| v.as_u64()), Some(2));
    let keys: Vec<String> = header.to_records().into_iter().map(|r| r.key).collect();
    assert_eq!(keys, ["a", "c"]);
}
