//! Routing of flat `namespace:path` header keys into per-namespace trees,
//! and the inverse flattening.

use indexmap::IndexMap;
use tracing::{trace, warn};

use crate::{
    error::Result,
    extension::{
        merge::merge,
        path::{Path, PathSegment},
        value::{ValueMap, ValueNode},
    },
    header::records::HeaderRecord,
};

/// Namespace that holds every unprefixed header key.
pub const DEFAULT_NAMESPACE: &str = "jnrrd";

pub const NAMESPACE_DELIMITER: char = ':';

/// Ordered mapping from namespace name to its root object.
///
/// The default namespace always exists and comes first; other namespaces
/// appear in first-use order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionTree {
    namespaces: IndexMap<String, ValueMap>,
}

impl Default for ExtensionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionTree {
    pub fn new() -> Self {
        let mut namespaces = IndexMap::new();
        namespaces.insert(DEFAULT_NAMESPACE.to_string(), ValueMap::new());
        Self { namespaces }
    }

    /// Builds a tree from records in file order; later records win at the
    /// same leaf.
    pub fn from_records<'a, I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a HeaderRecord>,
    {
        let mut tree = Self::new();
        for record in records {
            tree.insert_record(&record.key, record.value.clone())?;
        }
        Ok(tree)
    }

    /// Routes one flat key. Keys without `:` are stored verbatim in the
    /// default namespace; the rest of a prefixed key is parsed as a path.
    pub fn insert_record(&mut self, key: &str, value: ValueNode) -> Result<()> {
        match key.split_once(NAMESPACE_DELIMITER) {
            None => {
                trace!(key, "default namespace field");
                self.defaults_mut().insert(key.to_string(), value);
            }
            Some((namespace, rest)) => {
                let path = Path::parse(rest)?;
                trace!(namespace, path = %path, "extension field");
                self.set(namespace, &path, value);
            }
        }
        Ok(())
    }

    /// Merges `value` at `path` inside `namespace`, creating the namespace on
    /// first use.
    pub fn set(&mut self, namespace: &str, path: &Path, value: ValueNode) {
        merge(self.namespace_mut(namespace), path, value);
    }

    pub fn get(&self, namespace: &str, path: &Path) -> Option<&ValueNode> {
        let (name, rest) = path.split_first();
        self.namespace(namespace)?.get(name)?.get_segments(rest)
    }

    pub fn namespace(&self, name: &str) -> Option<&ValueMap> {
        self.namespaces.get(name)
    }

    pub fn namespace_mut(&mut self, name: &str) -> &mut ValueMap {
        self.namespaces.entry(name.to_string()).or_default()
    }

    pub fn remove_namespace(&mut self, name: &str) -> Option<ValueMap> {
        if name == DEFAULT_NAMESPACE {
            return self.namespaces.get_mut(name).map(std::mem::take);
        }
        self.namespaces.shift_remove(name)
    }

    pub fn defaults(&self) -> &ValueMap {
        &self.namespaces[DEFAULT_NAMESPACE]
    }

    pub fn defaults_mut(&mut self) -> &mut ValueMap {
        self.namespace_mut(DEFAULT_NAMESPACE)
    }

    /// Namespaces in order, default namespace included.
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &ValueMap)> {
        self.namespaces.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of the extension namespaces, default namespace excluded.
    pub fn extension_names(&self) -> impl Iterator<Item = &str> {
        self.namespaces
            .keys()
            .map(String::as_str)
            .filter(|name| *name != DEFAULT_NAMESPACE)
    }

    /// Flattens the tree back into header records.
    ///
    /// Default-namespace keys come out unprefixed with their whole value.
    /// Extension trees expand objects per key, keep scalar-only arrays
    /// whole, and expand arrays holding compound elements per index. An
    /// object with a key that is not a plain field name (empty, or holding
    /// `.`, `[` or `]`) is emitted whole.
    pub fn to_records(&self) -> Vec<HeaderRecord> {
        let mut out = Vec::new();
        for (namespace, root) in &self.namespaces {
            if namespace == DEFAULT_NAMESPACE {
                out.extend(
                    root.iter()
                        .map(|(key, value)| HeaderRecord::new(key.clone(), value.clone())),
                );
                continue;
            }
            for (key, value) in root {
                if !is_path_field(key) {
                    warn!(namespace, key, "extension key cannot be written as a path");
                }
                let mut path = Path::field(key.clone());
                flatten_node(namespace, &mut path, value, &mut out);
            }
        }
        out
    }
}

fn flatten_node(namespace: &str, path: &mut Path, node: &ValueNode, out: &mut Vec<HeaderRecord>) {
    match node {
        ValueNode::Object(map) if !map.is_empty() && map.keys().all(|k| is_path_field(k)) => {
            for (key, value) in map {
                path.push(PathSegment::Field(key.clone()));
                flatten_node(namespace, path, value, out);
                path.pop();
            }
        }
        ValueNode::Array(items) if !items.iter().all(ValueNode::is_scalar) => {
            for (index, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                flatten_node(namespace, path, item, out);
                path.pop();
            }
        }
        _ => out.push(HeaderRecord::new(
            format!("{namespace}{NAMESPACE_DELIMITER}{path}"),
            node.clone(),
        )),
    }
}

/// Whether `key` reads back as exactly one field segment.
#[inline]
fn is_path_field(key: &str) -> bool {
    !key.is_empty() && !key.contains(['.', '[', ']'])
}
