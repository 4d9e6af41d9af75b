mod helpers;

use jnrrd::{DataArray, Encoding, JnrrdError, WriteOptions, read_from_bytes, write_to_vec};

use helpers::header_of;

#[allow(dead_code)]
fn assert_missing(encoding: Encoding) {
    let array = DataArray::new(vec![2], vec![1u8, 2]).expect("new failed");
    match write_to_vec(&header_of(&[]), &array, &WriteOptions::new(encoding)) {
        Err(JnrrdError::MissingOptionalDependency { encoding: name, .. }) => {
            assert_eq!(name, encoding.name())
        }
        other => panic!("expected MissingOptionalDependency, got {other:?}"),
    }

    let file = format!(
        "{{\"jnrrd\":\"0004\"}}\n{{\"type\":\"uint8\"}}\n{{\"dimension\":1}}\n{{\"sizes\":[2]}}\n{{\"encoding\":\"{encoding}\"}}\n\n\x01\x02"
    );
    assert!(matches!(
        read_from_bytes(file.as_bytes()),
        Err(JnrrdError::MissingOptionalDependency { .. })
    ));
}

#[cfg(not(feature = "gzip"))]
#[test]
fn gzip_compiled_out() {
    assert_missing(Encoding::Gzip);
}

#[cfg(not(feature = "bzip2"))]
#[test]
fn bzip2_compiled_out() {
    assert_missing(Encoding::Bzip2);
}

#[cfg(not(feature = "zstd"))]
#[test]
fn zstd_compiled_out() {
    assert_missing(Encoding::Zstd);
}

#[cfg(not(feature = "lz4"))]
#[test]
fn lz4_compiled_out() {
    assert_missing(Encoding::Lz4);
}

#[test]
fn text_codecs_always_present() {
    let array = DataArray::new(vec![2], vec![1u8, 2]).expect("new failed");
    for encoding in [Encoding::Raw, Encoding::Ascii, Encoding::Hex] {
        let bytes = write_to_vec(&header_of(&[]), &array, &WriteOptions::new(encoding))
            .expect("write_to_vec failed");
        let (_, back) = read_from_bytes(&bytes).expect("read_from_bytes failed");
        assert_eq!(back, array);
    }
}
