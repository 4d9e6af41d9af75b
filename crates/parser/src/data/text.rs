//! Text payload encodings: `ascii` (one token per element) and `hex` (the
//! element bytes as hexadecimal digits).

use std::{
    fmt::{Display, Write},
    str::FromStr,
};

use half::{bf16, f16};
use num_complex::Complex;

use crate::{
    data::{
        buffer::{TypedBuffer, dispatch},
        dtype::ElementType,
        encoding::{ByteCodec, Encoding},
    },
    error::{JnrrdError, Result},
};

pub const ASCII_VALUES_PER_LINE: usize = 8;
pub const HEX_CHARS_PER_LINE: usize = 64;

/// Parses the first `count` whitespace-separated tokens of `input` as
/// `element_type` values. Extra tokens are ignored.
pub fn decode_ascii(input: &[u8], element_type: ElementType, count: usize) -> Result<TypedBuffer> {
    let text = std::str::from_utf8(input).map_err(|e| JnrrdError::Codec {
        encoding: Encoding::Ascii.name(),
        reason: e.to_string(),
    })?;
    let tokens: Vec<&str> = text.split_ascii_whitespace().take(count).collect();
    if tokens.len() < count {
        return Err(JnrrdError::InsufficientData {
            expected: count.saturating_mul(element_type.width()),
            available: tokens.len() * element_type.width(),
        });
    }

    let buffer = match element_type {
        ElementType::Int8 => TypedBuffer::Int8(parse_all(&tokens, element_type, parse_plain)?),
        ElementType::UInt8 => TypedBuffer::UInt8(parse_all(&tokens, element_type, parse_plain)?),
        ElementType::Int16 => TypedBuffer::Int16(parse_all(&tokens, element_type, parse_plain)?),
        ElementType::UInt16 => TypedBuffer::UInt16(parse_all(&tokens, element_type, parse_plain)?),
        ElementType::Int32 => TypedBuffer::Int32(parse_all(&tokens, element_type, parse_plain)?),
        ElementType::UInt32 => TypedBuffer::UInt32(parse_all(&tokens, element_type, parse_plain)?),
        ElementType::Int64 => TypedBuffer::Int64(parse_all(&tokens, element_type, parse_plain)?),
        ElementType::UInt64 => TypedBuffer::UInt64(parse_all(&tokens, element_type, parse_plain)?),
        ElementType::Float16 => TypedBuffer::Float16(parse_all(&tokens, element_type, |t| {
            t.parse::<f32>().ok().map(f16::from_f32)
        })?),
        ElementType::BFloat16 => TypedBuffer::BFloat16(parse_all(&tokens, element_type, |t| {
            t.parse::<f32>().ok().map(bf16::from_f32)
        })?),
        ElementType::Float32 => TypedBuffer::Float32(parse_all(&tokens, element_type, parse_plain)?),
        ElementType::Float64 => TypedBuffer::Float64(parse_all(&tokens, element_type, parse_plain)?),
        ElementType::Complex64 => {
            TypedBuffer::Complex64(parse_all(&tokens, element_type, parse_complex)?)
        }
        ElementType::Complex128 => {
            TypedBuffer::Complex128(parse_all(&tokens, element_type, parse_complex)?)
        }
    };
    Ok(buffer)
}

/// Writes every element as text, [`ASCII_VALUES_PER_LINE`] per line.
pub fn encode_ascii(buffer: &TypedBuffer) -> Vec<u8> {
    let mut out = String::with_capacity(buffer.len() * 8);
    match buffer {
        TypedBuffer::Complex64(values) => write_lines(&mut out, values, write_complex),
        TypedBuffer::Complex128(values) => write_lines(&mut out, values, write_complex),
        other => dispatch!(other, values => write_lines(&mut out, values, |out, v| {
            let _ = write!(out, "{v}");
        })),
    }
    out.into_bytes()
}

fn write_lines<T>(out: &mut String, values: &[T], write_value: impl Fn(&mut String, &T)) {
    for line in values.chunks(ASCII_VALUES_PER_LINE) {
        for (i, value) in line.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            write_value(out, value);
        }
        out.push('\n');
    }
}

fn write_complex<T: Display>(out: &mut String, value: &Complex<T>) {
    let im = value.im.to_string();
    let sign = if im.starts_with('-') { "" } else { "+" };
    let _ = write!(out, "{}{sign}{im}j", value.re);
}

fn parse_all<T>(
    tokens: &[&str],
    element_type: ElementType,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>> {
    tokens
        .iter()
        .map(|token| {
            parse(token).ok_or_else(|| JnrrdError::InvalidText {
                token: token.to_string(),
                element_type: element_type.name(),
            })
        })
        .collect()
}

#[inline]
fn parse_plain<T: FromStr>(token: &str) -> Option<T> {
    token.parse().ok()
}

/// Accepts `a+bj`, `(a+bj)`, `bj` and `a`.
fn parse_complex<T: FromStr>(token: &str) -> Option<Complex<T>> {
    let (re, im) = split_complex(token);
    let im = match im {
        "" | "+" => "1",
        "-" => "-1",
        other => other,
    };
    Some(Complex::new(re.parse().ok()?, im.parse().ok()?))
}

fn split_complex(token: &str) -> (&str, &str) {
    let token = token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(token);
    let Some(body) = token.strip_suffix(['j', 'J']) else {
        return (token, "0");
    };
    let bytes = body.as_bytes();
    let split = (1..bytes.len())
        .rev()
        .find(|&i| matches!(bytes[i], b'+' | b'-') && !matches!(bytes[i - 1], b'e' | b'E'));
    match split {
        Some(i) => (&body[..i], &body[i..]),
        None => ("0", body),
    }
}

/// Lowercase hexadecimal, [`HEX_CHARS_PER_LINE`] digits per line.
pub(crate) struct HexCodec;

impl ByteCodec for HexCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Hex
    }

    /// Ignores every character that is not a hex digit.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let nibbles: Vec<u8> = input.iter().filter_map(|&c| hex_value(c)).collect();
        if nibbles.len() % 2 != 0 {
            return Err(JnrrdError::Codec {
                encoding: Encoding::Hex.name(),
                reason: format!("odd number of hex digits ({})", nibbles.len()),
            });
        }
        Ok(nibbles
            .chunks_exact(2)
            .map(|pair| (pair[0] << 4) | pair[1])
            .collect())
    }

    fn encode(&self, input: &[u8], _level: Option<u32>) -> Result<Vec<u8>> {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let digits = input.len() * 2;
        let mut out = Vec::with_capacity(digits + digits / HEX_CHARS_PER_LINE + 1);
        for (i, byte) in input.iter().enumerate() {
            out.push(DIGITS[(byte >> 4) as usize]);
            out.push(DIGITS[(byte & 0x0F) as usize]);
            if (i + 1) % (HEX_CHARS_PER_LINE / 2) == 0 || i + 1 == input.len() {
                out.push(b'\n');
            }
        }
        Ok(out)
    }
}

#[inline]
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
