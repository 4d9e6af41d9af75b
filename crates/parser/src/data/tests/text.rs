use num_complex::Complex;

use crate::{
    data::{
        buffer::TypedBuffer,
        dtype::ElementType,
        encoding::ByteCodec,
        text::{HexCodec, decode_ascii, encode_ascii},
    },
    error::JnrrdError,
};

#[test]
fn ascii_lines_of_eight() {
    let buffer = TypedBuffer::from((1..=10).collect::<Vec<i32>>());
    let text = String::from_utf8(encode_ascii(&buffer)).expect("utf8");
    assert_eq!(text, "1 2 3 4 5 6 7 8\n9 10\n");
}

#[test]
fn ascii_parses_any_whitespace() {
    let buffer = decode_ascii(b"  1\t-2\n\n3   4 5", ElementType::Int16, 4).expect("decode failed");
    assert_eq!(buffer.as_slice::<i16>(), Some(&[1, -2, 3, 4][..]));
}

#[test]
fn ascii_floats_round_trip() {
    let values = vec![0.1f64, -1e-300, 12345.678, f64::MAX];
    let text = encode_ascii(&TypedBuffer::from(values.clone()));
    let back = decode_ascii(&text, ElementType::Float64, values.len()).expect("decode failed");
    assert_eq!(back.as_slice::<f64>(), Some(&values[..]));
}

#[test]
fn complex_forms() {
    let buffer = decode_ascii(
        b"1+2j (3-4j) 5j -6 1e-3+2.5e+2j (-0-1j) 2-j",
        ElementType::Complex128,
        7,
    )
    .expect("decode failed");
    assert_eq!(
        buffer.as_slice::<Complex<f64>>(),
        Some(
            &[
                Complex::new(1.0, 2.0),
                Complex::new(3.0, -4.0),
                Complex::new(0.0, 5.0),
                Complex::new(-6.0, 0.0),
                Complex::new(1e-3, 250.0),
                Complex::new(-0.0, -1.0),
                Complex::new(2.0, -1.0),
            ][..]
        )
    );
}

#[test]
fn complex_written_with_sign() {
    let buffer = TypedBuffer::from(vec![Complex::new(1.5f32, -2.0), Complex::new(0.0, 3.0)]);
    let text = String::from_utf8(encode_ascii(&buffer)).expect("utf8");
    assert_eq!(text, "1.5-2j 0+3j\n");
    let back = decode_ascii(text.as_bytes(), ElementType::Complex64, 2).expect("decode failed");
    assert_eq!(back, buffer);
}

#[test]
fn ascii_shortfall_and_bad_tokens() {
    assert!(matches!(
        decode_ascii(b"1 2 3", ElementType::Float32, 4),
        Err(JnrrdError::InsufficientData { expected: 16, available: 12 })
    ));
    assert!(matches!(
        decode_ascii(b"1 x 3", ElementType::UInt8, 3),
        Err(JnrrdError::InvalidText { token, element_type: "uint8" }) if token == "x"
    ));
    assert!(matches!(
        decode_ascii(b"300", ElementType::UInt8, 1),
        Err(JnrrdError::InvalidText { .. })
    ));
}

#[test]
fn ascii_ignores_trailing_tokens() {
    let buffer = decode_ascii(b"1 2 3 junk", ElementType::UInt8, 3).expect("decode failed");
    assert_eq!(buffer.as_slice::<u8>(), Some(&[1, 2, 3][..]));
}

#[test]
fn hex_wraps_at_sixty_four_digits() {
    let input: Vec<u8> = (0..40).collect();
    let encoded = HexCodec.encode(&input, None).expect("encode failed");
    let text = String::from_utf8(encoded.clone()).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].len(), 64);
    assert_eq!(lines[1].len(), 16);
    assert!(lines[0].starts_with("000102030405"));
    assert!(text.ends_with('\n'));
    assert_eq!(HexCodec.decode(&encoded).expect("decode failed"), input);
}

#[test]
fn hex_skips_non_digits() {
    let decoded = HexCodec.decode(b"DE ad\r\nbe-EF zz").expect("decode failed");
    assert_eq!(decoded, [0xde, 0xad, 0xbe, 0xef]);
    assert!(matches!(
        HexCodec.decode(b"abc"),
        Err(JnrrdError::Codec { encoding: "hex", .. })
    ));
}
