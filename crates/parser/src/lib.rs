//! Reader and writer for JNRRD files: line-delimited JSON header records
//! followed by a typed N-dimensional array payload, inline or detached.
//!
//! Header keys of the form `namespace:path` are folded into per-namespace
//! value trees on read and flattened back on write.

pub mod data;
pub mod error;
pub mod extension;
pub mod header;
#[cfg(feature = "ndarray")]
pub mod ndarray_ext;
pub mod reader;
pub mod writer;

pub use data::{ArrayDescriptor, ByteOrder, DataArray, Element, ElementType, Encoding, TypedBuffer};
pub use error::{JnrrdError, Result};
pub use extension::{DEFAULT_NAMESPACE, ExtensionTree, Path, PathSegment, Scalar, ValueMap, ValueNode};
pub use header::{DataLocation, Header, HeaderEnd, HeaderRecord};
pub use reader::{ParsedHeader, can_read_file, parse_header, read, read_from_bytes, read_header};
pub use writer::{WriteOptions, prepare_header, write, write_detached, write_to, write_to_vec};
