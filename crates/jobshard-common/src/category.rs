//! Record type categories.
//!
//! A record type takes part in partition key computation when it is a
//! schedulable trigger or a schedulable job instance. Classification is
//! explicit: the catalog provider tags each type exactly once, and the
//! hierarchy traversal never re-derives it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker category of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// The type represents a schedulable job trigger.
    Trigger,
    /// The type represents a schedulable job instance.
    Instance,
    /// The type takes no part in scheduling.
    Neither,
}

impl Category {
    /// Classify a type from its capability markers.
    ///
    /// A type claiming both markers cannot be assigned to a single output
    /// collection and is rejected up front.
    pub fn from_markers(is_trigger: bool, is_instance: bool, type_name: &str) -> Result<Self> {
        match (is_trigger, is_instance) {
            (true, true) => Err(Error::AmbiguousCategory {
                type_name: type_name.to_string(),
            }),
            (true, false) => Ok(Self::Trigger),
            (false, true) => Ok(Self::Instance),
            (false, false) => Ok(Self::Neither),
        }
    }

    /// Whether types of this category are schedulable work items.
    pub fn participates(self) -> bool {
        !matches!(self, Self::Neither)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger => write!(f, "trigger"),
            Self::Instance => write!(f, "instance"),
            Self::Neither => write!(f, "neither"),
        }
    }
}
