//! Abstract job state lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a schedulable work item.
///
/// Partition keys carry a mapping function from this abstract state to the
/// storage-native value; the default mapping serializes the state as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Scheduled but not yet picked up.
    New,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Done,
    /// Finished with an error.
    Failed,
    /// Missed its execution deadline.
    DeadlineReached,
    /// Dropped without execution.
    Dropped,
    /// Removed from storage after completion.
    Removed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Running => write!(f, "running"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
            Self::DeadlineReached => write!(f, "deadline_reached"),
            Self::Dropped => write!(f, "dropped"),
            Self::Removed => write!(f, "removed"),
        }
    }
}
