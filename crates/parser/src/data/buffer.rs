//! Contiguous typed element storage and the decoded array.

use half::{bf16, f16};
use num_complex::Complex;

use crate::{
    data::dtype::{ByteOrder, ElementType, swap_in_place},
    error::{JnrrdError, Result},
};

/// Elements in machine byte order, one variant per [`ElementType`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypedBuffer {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float16(Vec<f16>),
    BFloat16(Vec<bf16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Complex64(Vec<Complex<f32>>),
    Complex128(Vec<Complex<f64>>),
}

macro_rules! dispatch {
    ($buffer:expr, $values:ident => $body:expr) => {
        match $buffer {
            TypedBuffer::Int8($values) => $body,
            TypedBuffer::UInt8($values) => $body,
            TypedBuffer::Int16($values) => $body,
            TypedBuffer::UInt16($values) => $body,
            TypedBuffer::Int32($values) => $body,
            TypedBuffer::UInt32($values) => $body,
            TypedBuffer::Int64($values) => $body,
            TypedBuffer::UInt64($values) => $body,
            TypedBuffer::Float16($values) => $body,
            TypedBuffer::BFloat16($values) => $body,
            TypedBuffer::Float32($values) => $body,
            TypedBuffer::Float64($values) => $body,
            TypedBuffer::Complex64($values) => $body,
            TypedBuffer::Complex128($values) => $body,
        }
    };
}
pub(crate) use dispatch;

/// A Rust scalar that can live in a [`TypedBuffer`].
pub trait Element: Copy + Send + Sync + 'static {
    const ELEMENT_TYPE: ElementType;

    /// Reads one element from exactly `width` machine-order bytes.
    fn from_ne_chunk(chunk: &[u8]) -> Self;

    fn extend_ne(self, out: &mut Vec<u8>);

    fn wrap(values: Vec<Self>) -> TypedBuffer;

    fn view(buffer: &TypedBuffer) -> Option<&[Self]>;
}

macro_rules! impl_element {
    ($t:ty, $variant:ident, $n:expr) => {
        impl Element for $t {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;

            #[inline]
            fn from_ne_chunk(chunk: &[u8]) -> Self {
                let mut raw = [0u8; $n];
                raw.copy_from_slice(chunk);
                <$t>::from_ne_bytes(raw)
            }

            #[inline]
            fn extend_ne(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }

            fn wrap(values: Vec<Self>) -> TypedBuffer {
                TypedBuffer::$variant(values)
            }

            fn view(buffer: &TypedBuffer) -> Option<&[Self]> {
                match buffer {
                    TypedBuffer::$variant(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(i8, Int8, 1);
impl_element!(u8, UInt8, 1);
impl_element!(i16, Int16, 2);
impl_element!(u16, UInt16, 2);
impl_element!(i32, Int32, 4);
impl_element!(u32, UInt32, 4);
impl_element!(i64, Int64, 8);
impl_element!(u64, UInt64, 8);
impl_element!(f16, Float16, 2);
impl_element!(bf16, BFloat16, 2);
impl_element!(f32, Float32, 4);
impl_element!(f64, Float64, 8);

macro_rules! impl_complex_element {
    ($t:ty, $variant:ident, $n:expr) => {
        impl Element for Complex<$t> {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;

            #[inline]
            fn from_ne_chunk(chunk: &[u8]) -> Self {
                let (re, im) = chunk.split_at($n);
                Complex::new(<$t>::from_ne_chunk(re), <$t>::from_ne_chunk(im))
            }

            #[inline]
            fn extend_ne(self, out: &mut Vec<u8>) {
                self.re.extend_ne(out);
                self.im.extend_ne(out);
            }

            fn wrap(values: Vec<Self>) -> TypedBuffer {
                TypedBuffer::$variant(values)
            }

            fn view(buffer: &TypedBuffer) -> Option<&[Self]> {
                match buffer {
                    TypedBuffer::$variant(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
}

impl_complex_element!(f32, Complex64, 4);
impl_complex_element!(f64, Complex128, 8);

#[inline]
fn collect_ne<T: Element>(bytes: &[u8]) -> Vec<T> {
    bytes
        .chunks_exact(T::ELEMENT_TYPE.width())
        .map(T::from_ne_chunk)
        .collect()
}

impl TypedBuffer {
    /// Builds a buffer from payload bytes in `order`. Bytes past the last
    /// whole element are ignored.
    pub fn from_bytes(element_type: ElementType, bytes: &[u8], order: ByteOrder) -> Self {
        let mut owned;
        let bytes = if order.needs_swap() && element_type.swap_width() > 1 {
            owned = bytes.to_vec();
            swap_in_place(&mut owned, element_type.swap_width());
            &owned[..]
        } else {
            bytes
        };

        match element_type {
            ElementType::Int8 => TypedBuffer::Int8(collect_ne(bytes)),
            ElementType::UInt8 => TypedBuffer::UInt8(bytes.to_vec()),
            ElementType::Int16 => TypedBuffer::Int16(collect_ne(bytes)),
            ElementType::UInt16 => TypedBuffer::UInt16(collect_ne(bytes)),
            ElementType::Int32 => TypedBuffer::Int32(collect_ne(bytes)),
            ElementType::UInt32 => TypedBuffer::UInt32(collect_ne(bytes)),
            ElementType::Int64 => TypedBuffer::Int64(collect_ne(bytes)),
            ElementType::UInt64 => TypedBuffer::UInt64(collect_ne(bytes)),
            ElementType::Float16 => TypedBuffer::Float16(collect_ne(bytes)),
            ElementType::BFloat16 => TypedBuffer::BFloat16(collect_ne(bytes)),
            ElementType::Float32 => TypedBuffer::Float32(collect_ne(bytes)),
            ElementType::Float64 => TypedBuffer::Float64(collect_ne(bytes)),
            ElementType::Complex64 => TypedBuffer::Complex64(collect_ne(bytes)),
            ElementType::Complex128 => TypedBuffer::Complex128(collect_ne(bytes)),
        }
    }

    /// Serializes every element in `order`.
    pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        let element_type = self.element_type();
        let mut out = Vec::with_capacity(self.len() * element_type.width());
        dispatch!(self, values => values.iter().for_each(|v| v.extend_ne(&mut out)));
        if order.needs_swap() {
            swap_in_place(&mut out, element_type.swap_width());
        }
        out
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            TypedBuffer::Int8(_) => ElementType::Int8,
            TypedBuffer::UInt8(_) => ElementType::UInt8,
            TypedBuffer::Int16(_) => ElementType::Int16,
            TypedBuffer::UInt16(_) => ElementType::UInt16,
            TypedBuffer::Int32(_) => ElementType::Int32,
            TypedBuffer::UInt32(_) => ElementType::UInt32,
            TypedBuffer::Int64(_) => ElementType::Int64,
            TypedBuffer::UInt64(_) => ElementType::UInt64,
            TypedBuffer::Float16(_) => ElementType::Float16,
            TypedBuffer::BFloat16(_) => ElementType::BFloat16,
            TypedBuffer::Float32(_) => ElementType::Float32,
            TypedBuffer::Float64(_) => ElementType::Float64,
            TypedBuffer::Complex64(_) => ElementType::Complex64,
            TypedBuffer::Complex128(_) => ElementType::Complex128,
        }
    }

    pub fn len(&self) -> usize {
        dispatch!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len() * self.element_type().width()
    }

    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::view(self)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        dispatch!(self, values => values.truncate(len))
    }
}

impl<T: Element> From<Vec<T>> for TypedBuffer {
    fn from(values: Vec<T>) -> Self {
        T::wrap(values)
    }
}

/// A decoded array: contiguous elements plus the sizes of each axis.
///
/// The first size is the outermost (slowest varying) axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    sizes: Vec<usize>,
    buffer: TypedBuffer,
}

impl DataArray {
    /// Fails when `sizes` is empty, holds a zero, or describes a different
    /// element count than the buffer holds.
    pub fn new(sizes: Vec<usize>, buffer: impl Into<TypedBuffer>) -> Result<Self> {
        let buffer = buffer.into();
        if sizes.is_empty() || sizes.contains(&0) {
            return Err(JnrrdError::InvalidField {
                field: "sizes",
                reason: format!("sizes {sizes:?} must be non-empty and positive"),
            });
        }
        let Some(expected) = checked_element_count(&sizes) else {
            return Err(JnrrdError::InvalidField {
                field: "sizes",
                reason: format!("sizes {sizes:?} overflow the element count"),
            });
        };
        if expected != buffer.len() {
            return Err(JnrrdError::InvalidField {
                field: "sizes",
                reason: format!(
                    "sizes {sizes:?} describe {expected} elements but the buffer holds {}",
                    buffer.len()
                ),
            });
        }
        Ok(Self { sizes, buffer })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn dimension(&self) -> usize {
        self.sizes.len()
    }

    pub fn element_type(&self) -> ElementType {
        self.buffer.element_type()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &TypedBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> TypedBuffer {
        self.buffer
    }

    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        self.buffer.as_slice()
    }
}

/// `Π(sizes)`, saturating at `usize::MAX`. A saturated count never matches a
/// real buffer, so [`DataArray::new`] rejects it.
#[inline]
pub fn element_count(sizes: &[usize]) -> usize {
    checked_element_count(sizes).unwrap_or(usize::MAX)
}

/// `Π(sizes)`, or `None` on overflow.
#[inline]
pub fn checked_element_count(sizes: &[usize]) -> Option<usize> {
    sizes.iter().try_fold(1usize, |count, &size| count.checked_mul(size))
}
