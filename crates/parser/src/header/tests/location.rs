use std::{fs, path::Path};

use serde_json::json;

use crate::{
    error::JnrrdError,
    header::{
        Header, HeaderRecord,
        location::{DataLocation, skip_lines},
    },
};

fn header_with(entries: &[(&str, serde_json::Value)]) -> Header {
    let records: Vec<HeaderRecord> = entries
        .iter()
        .map(|(key, value)| HeaderRecord::new(*key, value.clone()))
        .collect();
    Header::from_records(&records).expect("from_records failed")
}

#[test]
fn inline_adds_byte_skip_and_ignores_line_skip() {
    let header = header_with(&[("byte_skip", json!(4)), ("line_skip", json!(3))]);
    let location = DataLocation::from_header(&header, Some(Path::new("/tmp/a.jnrrd")), 100)
        .expect("from_header failed");
    assert_eq!(location, DataLocation::Inline { offset: 104 });
    assert_eq!(location.start_offset().expect("start_offset failed"), 104);
}

#[test]
fn relative_data_file_resolves_against_header_dir() {
    let header = header_with(&[("data_file", json!("vol.raw")), ("line_skip", json!(2))]);
    let location = DataLocation::from_header(&header, Some(Path::new("/data/set/vol.jnrrd")), 50)
        .expect("from_header failed");
    assert_eq!(
        location,
        DataLocation::Detached {
            path: Path::new("/data/set/vol.raw").to_path_buf(),
            line_skip: 2,
            byte_skip: 0,
        }
    );
    assert!(location.is_detached());
}

#[test]
fn absolute_data_file_kept() {
    let header = header_with(&[("data_file", json!("/abs/vol.raw"))]);
    let location =
        DataLocation::from_header(&header, Some(Path::new("rel/vol.jnrrd")), 0).expect("from_header failed");
    assert!(matches!(location, DataLocation::Detached { ref path, .. } if path == Path::new("/abs/vol.raw")));
}

#[test]
fn detached_offset_skips_lines_then_bytes() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let data = dir.path().join("vol.raw");
    fs::write(&data, b"line one\nline two\r\nXXpayload").expect("write failed");

    let location = DataLocation::Detached {
        path: data,
        line_skip: 2,
        byte_skip: 2,
    };
    assert_eq!(location.start_offset().expect("start_offset failed"), 21);
}

#[test]
fn skip_lines_stops_at_end() {
    assert_eq!(skip_lines(&b"a\nb"[..], 5).expect("skip_lines failed"), 3);
    assert_eq!(skip_lines(&b"a\nb\n"[..], 1).expect("skip_lines failed"), 2);
}

#[test]
fn overflowing_byte_skip_is_an_error() {
    let header = header_with(&[("byte_skip", json!(u64::MAX))]);
    let result = DataLocation::from_header(&header, None, 40);
    assert!(matches!(result, Err(JnrrdError::InvalidField { field: "byte_skip", .. })));

    let dir = tempfile::tempdir().expect("tempdir failed");
    let data = dir.path().join("vol.raw");
    fs::write(&data, b"skip me\npayload").expect("write failed");
    let location = DataLocation::Detached {
        path: data,
        line_skip: 1,
        byte_skip: u64::MAX,
    };
    assert!(matches!(
        location.start_offset(),
        Err(JnrrdError::InvalidField { field: "byte_skip", .. })
    ));
}
