//! Jobshard attribute binding configuration.
//!
//! This crate provides:
//! - Typed Rust structs for per-category binding overrides
//! - Resolved runtime bindings with documented defaults
//! - Binding validation
//!
//! The job execution engine locates records through five storage attributes
//! per category (id, schedule, last execution, partition, state) plus a
//! mapping from the abstract job state to the storage-native value.

pub mod bindings;

pub use bindings::{
    AttributeBindings, BindingOverrides, CategoryBindings, StateValueMapper,
    DEFAULT_ID_ATTRIBUTE, DEFAULT_LAST_EXECUTION_ATTRIBUTE, DEFAULT_SCHEDULE_ATTRIBUTE,
    DEFAULT_STATE_ATTRIBUTE,
};

/// Schema version for binding override documents.
pub const BINDINGS_SCHEMA_VERSION: &str = "1.0.0";
