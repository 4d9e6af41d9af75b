//! The decoded header: a namespaced value tree plus typed access to the
//! fields that describe the payload.

pub mod location;
pub mod records;

pub use location::DataLocation;
pub use records::{HeaderEnd, HeaderRecord, HeaderScan, MAGIC_KEY, read_records, write_records};

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    data::{ArrayDescriptor, ByteOrder, ElementType, Encoding},
    error::{JnrrdError, Result},
    extension::{DEFAULT_NAMESPACE, ExtensionTree, Path, ValueMap, ValueNode},
};

/// Names of the core fields in the default namespace.
pub mod fields {
    pub const MAGIC: &str = super::MAGIC_KEY;
    pub const TYPE: &str = "type";
    pub const DIMENSION: &str = "dimension";
    pub const SIZES: &str = "sizes";
    pub const ENCODING: &str = "encoding";
    pub const ENDIAN: &str = "endian";
    pub const DATA_FILE: &str = "data_file";
    pub const LINE_SKIP: &str = "line_skip";
    pub const BYTE_SKIP: &str = "byte_skip";
    pub const EXTENSIONS: &str = "extensions";
}

/// Format version written when a header carries none.
pub const FORMAT_VERSION: &str = "0004";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    tree: ExtensionTree,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a, I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a HeaderRecord>,
    {
        Ok(Self {
            tree: ExtensionTree::from_records(records)?,
        })
    }

    pub fn to_records(&self) -> Vec<HeaderRecord> {
        self.tree.to_records()
    }

    pub fn tree(&self) -> &ExtensionTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ExtensionTree {
        &mut self.tree
    }

    /// A default-namespace field.
    pub fn get(&self, key: &str) -> Option<&ValueNode> {
        self.tree.defaults().get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tree.defaults().contains_key(key)
    }

    /// Sets a default-namespace field, keeping its position when it exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ValueNode>) {
        self.tree.defaults_mut().insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ValueNode> {
        self.tree.defaults_mut().shift_remove(key)
    }

    /// Root object of an extension namespace.
    pub fn extension(&self, namespace: &str) -> Option<&ValueMap> {
        if namespace == DEFAULT_NAMESPACE {
            return None;
        }
        self.tree.namespace(namespace)
    }

    pub fn extension_value(&self, namespace: &str, path: &Path) -> Option<&ValueNode> {
        self.tree.get(namespace, path)
    }

    pub fn set_extension(&mut self, namespace: &str, path: &Path, value: impl Into<ValueNode>) {
        self.tree.set(namespace, path, value.into());
    }

    /// The `extensions` declaration object (namespace name to URI), if any.
    pub fn declared_extensions(&self) -> Option<&ValueMap> {
        self.get(fields::EXTENSIONS)?.as_object()
    }

    pub fn version(&self) -> Option<&str> {
        self.get(fields::MAGIC)?.as_str()
    }

    pub fn element_type(&self) -> Result<ElementType> {
        ElementType::from_name(self.required_str(fields::TYPE)?)
    }

    pub fn dimension(&self) -> Result<usize> {
        let value = self
            .get(fields::DIMENSION)
            .ok_or(JnrrdError::MissingRequiredField(fields::DIMENSION))?;
        match value.as_u64() {
            Some(n) if n > 0 => Ok(n as usize),
            _ => Err(JnrrdError::InvalidField {
                field: fields::DIMENSION,
                reason: format!("expected a positive integer, got {}", json_text(value)),
            }),
        }
    }

    /// Axis sizes; every size is positive and there is one per dimension.
    pub fn sizes(&self) -> Result<Vec<usize>> {
        let value = self
            .get(fields::SIZES)
            .ok_or(JnrrdError::MissingRequiredField(fields::SIZES))?;
        let invalid = || JnrrdError::InvalidField {
            field: fields::SIZES,
            reason: format!("expected an array of positive integers, got {}", json_text(value)),
        };
        let sizes = value
            .as_array()
            .ok_or_else(invalid)?
            .iter()
            .map(|size| match size.as_u64() {
                Some(n) if n > 0 => usize::try_from(n).map_err(|_| invalid()),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>>>()?;

        let dimension = self.dimension()?;
        if sizes.len() != dimension {
            return Err(JnrrdError::InvalidField {
                field: fields::SIZES,
                reason: format!("{} sizes for dimension {dimension}", sizes.len()),
            });
        }
        Ok(sizes)
    }

    /// Defaults to raw when absent.
    pub fn encoding(&self) -> Result<Encoding> {
        match self.optional_str(fields::ENCODING)? {
            Some(name) => Encoding::from_name(name),
            None => Ok(Encoding::Raw),
        }
    }

    /// Defaults to the machine order when absent.
    pub fn byte_order(&self) -> Result<ByteOrder> {
        match self.optional_str(fields::ENDIAN)? {
            Some(name) => ByteOrder::from_name(name),
            None => Ok(ByteOrder::Native),
        }
    }

    /// Fails with `InvalidField` when the payload size does not fit in
    /// `usize`.
    pub fn descriptor(&self) -> Result<ArrayDescriptor> {
        let descriptor = ArrayDescriptor {
            element_type: self.element_type()?,
            byte_order: self.byte_order()?,
            sizes: self.sizes()?,
        };
        if descriptor.checked_byte_len().is_none() {
            return Err(JnrrdError::InvalidField {
                field: fields::SIZES,
                reason: format!(
                    "{:?} {} elements overflow the addressable size",
                    descriptor.sizes, descriptor.element_type
                ),
            });
        }
        Ok(descriptor)
    }

    pub fn data_file(&self) -> Result<Option<&str>> {
        self.optional_str(fields::DATA_FILE)
    }

    pub fn line_skip(&self) -> Result<u64> {
        self.optional_count(fields::LINE_SKIP)
    }

    pub fn byte_skip(&self) -> Result<u64> {
        self.optional_count(fields::BYTE_SKIP)
    }

    fn required_str(&self, field: &'static str) -> Result<&str> {
        self.optional_str(field)?
            .ok_or(JnrrdError::MissingRequiredField(field))
    }

    fn optional_str(&self, field: &'static str) -> Result<Option<&str>> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => value.as_str().map(Some).ok_or_else(|| JnrrdError::InvalidField {
                field,
                reason: format!("expected a string, got {}", json_text(value)),
            }),
        }
    }

    fn optional_count(&self, field: &'static str) -> Result<u64> {
        match self.get(field) {
            None => Ok(0),
            Some(value) => value.as_u64().ok_or_else(|| JnrrdError::InvalidField {
                field,
                reason: format!("expected a non-negative integer, got {}", json_text(value)),
            }),
        }
    }
}

fn json_text(value: &ValueNode) -> String {
    serde_json::Value::from(value).to_string()
}

/// Serializes as `{ namespace: root, ... }`, default namespace first.
impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (namespace, root) in self.tree.namespaces() {
            map.serialize_entry(namespace, root)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests;
