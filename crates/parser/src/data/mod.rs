//! Typed payload handling: element types, buffers, encodings, and the
//! decode/encode pipeline that ties them to a header's array description.

pub mod buffer;
pub mod dtype;
pub mod encoding;
pub mod text;

pub use buffer::{DataArray, Element, TypedBuffer, checked_element_count, element_count};
pub use dtype::{ByteOrder, ElementType, TYPE_TABLE, TypeInfo};
pub use encoding::{ByteCodec, Codec, Encoding, codec_for};

use tracing::debug;

use crate::error::{JnrrdError, Result};

/// Everything needed to interpret payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDescriptor {
    pub element_type: ElementType,
    pub byte_order: ByteOrder,
    pub sizes: Vec<usize>,
}

impl ArrayDescriptor {
    #[inline]
    pub fn element_count(&self) -> usize {
        element_count(&self.sizes)
    }

    /// `Π(sizes) × width`, saturating like [`element_count`].
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.checked_byte_len().unwrap_or(usize::MAX)
    }

    pub fn checked_byte_len(&self) -> Option<usize> {
        checked_element_count(&self.sizes)?.checked_mul(self.element_type.width())
    }
}

/// Decodes `payload` (everything from the data offset on) into exactly
/// `descriptor.element_count()` elements.
pub fn decode_payload(
    payload: &[u8],
    descriptor: &ArrayDescriptor,
    encoding: Encoding,
) -> Result<TypedBuffer> {
    match codec_for(encoding)? {
        Codec::Text => {
            text::decode_ascii(payload, descriptor.element_type, descriptor.element_count())
        }
        Codec::Bytes(codec) => {
            let decoded = codec.decode(payload)?;
            let expected = descriptor.byte_len();
            if decoded.len() < expected {
                return Err(JnrrdError::InsufficientData {
                    expected,
                    available: decoded.len(),
                });
            }
            debug!(
                encoding = %encoding,
                expected,
                decoded = decoded.len(),
                "decoded payload"
            );
            Ok(TypedBuffer::from_bytes(
                descriptor.element_type,
                &decoded[..expected],
                descriptor.byte_order,
            ))
        }
    }
}

/// Serializes `buffer` in `byte_order` and applies `encoding`.
pub fn encode_payload(
    buffer: &TypedBuffer,
    byte_order: ByteOrder,
    encoding: Encoding,
    level: Option<u32>,
) -> Result<Vec<u8>> {
    match codec_for(encoding)? {
        Codec::Text => Ok(text::encode_ascii(buffer)),
        Codec::Bytes(codec) => codec.encode(&buffer.to_bytes(byte_order), level),
    }
}

#[cfg(test)]
mod tests;
