//! Error types for jobshard.
//!
//! Partition key computation runs once at startup over trusted input, so
//! every error here is fatal to system bring-up: the caller aborts
//! initialization, nothing is retried or silently ignored.

use thiserror::Error;

/// Result type alias for jobshard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for jobshard.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid attribute bindings: {0}")]
    InvalidBindings(String),

    // Catalog errors (20-29)
    #[error("type {type_name} claims both trigger and instance markers")]
    AmbiguousCategory { type_name: String },

    #[error("type {type_name} names unknown supertype {supertype}")]
    UnknownSupertype {
        type_name: String,
        supertype: String,
    },

    #[error("supertype chain of {type_name} contains a cycle")]
    CyclicHierarchy { type_name: String },

    #[error("duplicate type name in catalog: {0}")]
    DuplicateType(String),

    // Serialization errors (60-69)
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting at startup-abort time.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidBindings(_) => 11,
            Error::AmbiguousCategory { .. } => 20,
            Error::UnknownSupertype { .. } => 21,
            Error::CyclicHierarchy { .. } => 22,
            Error::DuplicateType(_) => 23,
            Error::Json(_) => 60,
        }
    }
}
