//! Error types for the record store and query parsing.

use std::io;

/// Failures raised while importing, persisting, or loading records.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure while reading or writing a snapshot or import file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The import payload is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The import payload parsed, but its top level is not an array.
    #[error("import file must contain an array of objects")]
    NotAnArray,

    /// An array element is not a JSON object.
    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },

    /// A field value cannot be cast to the record schema.
    #[error("record {index}: field '{field}' {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },

    /// Snapshot bytes failed checksum or decoding.
    #[error("corrupt snapshot {path}: {reason}")]
    CorruptSnapshot { path: String, reason: String },
}

/// Rejected filter or pagination input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// A parameter that must be an integer was not.
    #[error("invalid {param} '{value}': expected an integer")]
    NotAnInteger { param: &'static str, value: String },

    /// A numeric parameter fell outside its accepted range.
    #[error("{param} must be between {min} and {max}")]
    OutOfRange {
        param: &'static str,
        min: usize,
        max: usize,
    },
}
