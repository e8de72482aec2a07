//! Jobshard common types, categories, and errors.
//!
//! This crate provides foundational types shared across jobshard crates:
//! - Record type categories (trigger vs instance classification)
//! - The abstract job state lifecycle
//! - Common error types

pub mod category;
pub mod error;
pub mod state;

pub use category::Category;
pub use error::{Error, Result};
pub use state::JobState;
