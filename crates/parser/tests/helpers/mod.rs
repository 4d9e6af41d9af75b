use std::path::PathBuf;

use half::{bf16, f16};
use jnrrd::{DataArray, Encoding, Header, HeaderRecord, data::codec_for};
use num_complex::Complex;
use serde_json::Value;

#[allow(dead_code)]
pub fn header_of(entries: &[(&str, Value)]) -> Header {
    let records: Vec<HeaderRecord> = entries
        .iter()
        .map(|(key, value)| HeaderRecord::new(*key, value.clone()))
        .collect();
    Header::from_records(&records).unwrap_or_else(|e| panic!("from_records failed: {e}"))
}

/// Encodings whose codec is compiled into this build.
#[allow(dead_code)]
pub fn compiled_encodings() -> Vec<Encoding> {
    Encoding::ALL
        .into_iter()
        .filter(|encoding| codec_for(*encoding).is_ok())
        .collect()
}

/// One 2x3 array per element type, with values near each type's limits.
#[allow(dead_code)]
pub fn sample_arrays() -> Vec<DataArray> {
    fn array<T: jnrrd::Element>(values: Vec<T>) -> DataArray {
        DataArray::new(vec![2, 3], values).unwrap_or_else(|e| panic!("DataArray::new failed: {e}"))
    }
    let halves = |xs: [f32; 6]| xs.map(f16::from_f32).to_vec();
    let brains = |xs: [f32; 6]| xs.map(bf16::from_f32).to_vec();

    vec![
        array(vec![i8::MIN, -1, 0, 1, 2, i8::MAX]),
        array(vec![0u8, 1, 2, 3, 254, u8::MAX]),
        array(vec![i16::MIN, -300, 0, 7, 300, i16::MAX]),
        array(vec![0u16, 1, 256, 4097, 40000, u16::MAX]),
        array(vec![i32::MIN, -70000, 0, 1, 70000, i32::MAX]),
        array(vec![0u32, 1, 65536, 3_000_000_000, 7, u32::MAX]),
        array(vec![i64::MIN, -1, 0, 1 << 40, 12345, i64::MAX]),
        array(vec![0u64, 1, 1 << 50, 99, 100, u64::MAX]),
        array(halves([0.5, -1.25, 3.0, 65504.0, 0.0, -0.0])),
        array(brains([1.0, -2.5, 0.15625, 3.0e10, -1.0e-5, 0.0])),
        array(vec![0.1f32, -2.5e-8, 1.0e30, f32::MIN_POSITIVE, 0.0, -7.75]),
        array(vec![0.1f64, -2.5e-300, 1.0e300, f64::EPSILON, 0.0, -7.75]),
        array(vec![
            Complex::new(1.5f32, -2.0),
            Complex::new(0.0, 0.1),
            Complex::new(-3.0, 4.0),
            Complex::new(1.0e-7, 0.0),
            Complex::new(-0.5, -0.5),
            Complex::new(8.0, 1.0e20),
        ]),
        array(vec![
            Complex::new(1.5f64, -2.0),
            Complex::new(0.0, 0.1),
            Complex::new(-3.0, 4.0),
            Complex::new(1.0e-200, 0.0),
            Complex::new(-0.5, -0.5),
            Complex::new(8.0, 1.0e200),
        ]),
    ]
}

#[allow(dead_code)]
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"))
}

#[allow(dead_code)]
pub fn temp_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}
