//! Element types and byte order.

use std::{fmt, str::FromStr};

use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::error::{JnrrdError, Result};

/// Element type of the array payload, as named by the `type` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float16,
    BFloat16,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

/// One row of the type table.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub element_type: ElementType,
    pub name: &'static str,
    /// Bytes per element.
    pub width: usize,
    /// The Rust scalar stored in the matching [`TypedBuffer`](crate::TypedBuffer) variant.
    pub rust_type: &'static str,
}

pub static TYPE_TABLE: [TypeInfo; 14] = [
    TypeInfo { element_type: ElementType::Int8, name: "int8", width: 1, rust_type: "i8" },
    TypeInfo { element_type: ElementType::UInt8, name: "uint8", width: 1, rust_type: "u8" },
    TypeInfo { element_type: ElementType::Int16, name: "int16", width: 2, rust_type: "i16" },
    TypeInfo { element_type: ElementType::UInt16, name: "uint16", width: 2, rust_type: "u16" },
    TypeInfo { element_type: ElementType::Int32, name: "int32", width: 4, rust_type: "i32" },
    TypeInfo { element_type: ElementType::UInt32, name: "uint32", width: 4, rust_type: "u32" },
    TypeInfo { element_type: ElementType::Int64, name: "int64", width: 8, rust_type: "i64" },
    TypeInfo { element_type: ElementType::UInt64, name: "uint64", width: 8, rust_type: "u64" },
    TypeInfo { element_type: ElementType::Float16, name: "float16", width: 2, rust_type: "half::f16" },
    TypeInfo { element_type: ElementType::BFloat16, name: "bfloat16", width: 2, rust_type: "half::bf16" },
    TypeInfo { element_type: ElementType::Float32, name: "float32", width: 4, rust_type: "f32" },
    TypeInfo { element_type: ElementType::Float64, name: "float64", width: 8, rust_type: "f64" },
    TypeInfo { element_type: ElementType::Complex64, name: "complex64", width: 8, rust_type: "Complex<f32>" },
    TypeInfo { element_type: ElementType::Complex128, name: "complex128", width: 16, rust_type: "Complex<f64>" },
];

static BY_NAME: Lazy<HashMap<&'static str, ElementType>> = Lazy::new(|| {
    TYPE_TABLE
        .iter()
        .map(|info| (info.name, info.element_type))
        .collect()
});

impl ElementType {
    pub fn from_name(name: &str) -> Result<Self> {
        BY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| JnrrdError::UnknownElementType(name.to_string()))
    }

    #[inline]
    pub fn info(self) -> &'static TypeInfo {
        &TYPE_TABLE[self as usize]
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    #[inline]
    pub fn width(self) -> usize {
        self.info().width
    }

    /// Width of the unit a byte swap applies to. Complex values swap their
    /// real and imaginary parts separately.
    #[inline]
    pub fn swap_width(self) -> usize {
        if self.is_complex() {
            self.width() / 2
        } else {
            self.width()
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ElementType::Int8
                | ElementType::UInt8
                | ElementType::Int16
                | ElementType::UInt16
                | ElementType::Int32
                | ElementType::UInt32
                | ElementType::Int64
                | ElementType::UInt64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            ElementType::Float16 | ElementType::BFloat16 | ElementType::Float32 | ElementType::Float64
        )
    }

    pub fn is_complex(self) -> bool {
        matches!(self, ElementType::Complex64 | ElementType::Complex128)
    }
}

impl FromStr for ElementType {
    type Err = JnrrdError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order of multi-byte elements in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    Little,
    Big,
    /// The byte order of the running machine; used when `endian` is absent.
    #[default]
    Native,
}

impl ByteOrder {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "little" => Ok(ByteOrder::Little),
            "big" => Ok(ByteOrder::Big),
            "native" => Ok(ByteOrder::Native),
            other => Err(JnrrdError::InvalidField {
                field: "endian",
                reason: format!("expected \"little\" or \"big\", got {other:?}"),
            }),
        }
    }

    /// Resolves `Native` to the concrete order of this machine.
    pub fn resolve(self) -> Self {
        match self {
            ByteOrder::Native if cfg!(target_endian = "big") => ByteOrder::Big,
            ByteOrder::Native => ByteOrder::Little,
            other => other,
        }
    }

    /// Name as written to the `endian` field; `Native` is resolved first.
    pub fn name(self) -> &'static str {
        match self.resolve() {
            ByteOrder::Big => "big",
            _ => "little",
        }
    }

    /// Whether bytes in this order differ from the machine's.
    #[inline]
    pub fn needs_swap(self) -> bool {
        self.resolve() != ByteOrder::Native.resolve()
    }
}

/// Reverses every `unit`-byte group of `bytes` in place.
#[inline]
pub fn swap_in_place(bytes: &mut [u8], unit: usize) {
    if unit <= 1 {
        return;
    }
    for chunk in bytes.chunks_exact_mut(unit) {
        chunk.reverse();
    }
}
