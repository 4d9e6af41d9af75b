//! The extension path algebra: path parsing, nested merging, namespace
//! routing and flattening.

pub mod merge;
pub mod namespace;
pub mod path;
pub mod value;

pub use merge::merge;
pub use namespace::{DEFAULT_NAMESPACE, ExtensionTree};
pub use path::{MAX_INDEX, Path, PathSegment};
pub use value::{Scalar, ValueMap, ValueNode};

#[cfg(test)]
mod tests;
