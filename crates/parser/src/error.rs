//! Error types for reading and writing JNRRD files.

use thiserror::Error;

/// Every failure the library can report. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum JnrrdError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A namespaced header key whose path part cannot be parsed.
    #[error("invalid path {path:?} at byte {position}: {reason}")]
    PathSyntax {
        path: String,
        position: usize,
        reason: &'static str,
    },

    /// A line that is neither blank nor a single-key JSON object.
    #[error("malformed header line {line}: {reason}")]
    MalformedHeaderLine { line: usize, reason: String },

    #[error("missing required header field {0:?}")]
    MissingRequiredField(&'static str),

    /// A header field is present but its value cannot be used.
    #[error("invalid header field {field:?}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown element type {0:?}")]
    UnknownElementType(String),

    /// Typed access asked for a different element type than the array holds.
    #[error("element type mismatch: expected {expected}, array holds {actual}")]
    ElementTypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unsupported encoding {0:?}")]
    UnsupportedEncoding(String),

    #[error("insufficient data: expected {expected} bytes, got {available}")]
    InsufficientData { expected: usize, available: usize },

    /// The encoding is known but its codec was compiled out.
    #[error("encoding {encoding:?} requires the {feature:?} feature")]
    MissingOptionalDependency {
        encoding: &'static str,
        feature: &'static str,
    },

    #[error("{encoding} codec failed: {reason}")]
    Codec {
        encoding: &'static str,
        reason: String,
    },

    #[error("cannot parse {token:?} as {element_type}")]
    InvalidText {
        token: String,
        element_type: &'static str,
    },

    #[error("header references a detached data file; read it from disk instead")]
    DetachedDataUnavailable,
}

pub type Result<T> = std::result::Result<T, JnrrdError>;
