//! Attribute bindings for partition keys.
//!
//! Every binding has a documented default and can be overridden per
//! category. The state value mapper is supplied programmatically; the
//! default serializes the abstract state unchanged.

use jobshard_common::{Error, JobState, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Default id attribute name.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";
/// Default schedule attribute name.
pub const DEFAULT_SCHEDULE_ATTRIBUTE: &str = "scheduleTime";
/// Default last execution attribute name.
pub const DEFAULT_LAST_EXECUTION_ATTRIBUTE: &str = "lastExecutionTime";
/// Default state attribute name.
pub const DEFAULT_STATE_ATTRIBUTE: &str = "state";

/// Mapping from the abstract job state to the storage-native state value.
pub type StateValueMapper = Arc<dyn Fn(JobState) -> Value + Send + Sync>;

fn identity_mapper() -> StateValueMapper {
    Arc::new(|state| serde_json::to_value(state).unwrap_or(Value::Null))
}

/// Per-category binding overrides as they appear in configuration documents.
///
/// Unset fields fall back to the documented defaults; the partition
/// attribute additionally follows an overridden id attribute unless it is
/// itself overridden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BindingOverrides {
    #[serde(default)]
    pub id_attribute: Option<String>,

    #[serde(default)]
    pub schedule_attribute: Option<String>,

    #[serde(default)]
    pub last_execution_attribute: Option<String>,

    #[serde(default)]
    pub partition_attribute: Option<String>,

    #[serde(default)]
    pub state_attribute: Option<String>,
}

/// Resolved attribute bindings for one partition key category.
#[derive(Clone)]
pub struct CategoryBindings {
    pub id_attribute: String,
    pub schedule_attribute: String,
    pub last_execution_attribute: String,
    pub partition_attribute: String,
    pub state_attribute: String,
    pub state_value_mapper: StateValueMapper,
}

impl Default for CategoryBindings {
    fn default() -> Self {
        Self {
            id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
            schedule_attribute: DEFAULT_SCHEDULE_ATTRIBUTE.to_string(),
            last_execution_attribute: DEFAULT_LAST_EXECUTION_ATTRIBUTE.to_string(),
            partition_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
            state_attribute: DEFAULT_STATE_ATTRIBUTE.to_string(),
            state_value_mapper: identity_mapper(),
        }
    }
}

impl fmt::Debug for CategoryBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryBindings")
            .field("id_attribute", &self.id_attribute)
            .field("schedule_attribute", &self.schedule_attribute)
            .field("last_execution_attribute", &self.last_execution_attribute)
            .field("partition_attribute", &self.partition_attribute)
            .field("state_attribute", &self.state_attribute)
            .finish_non_exhaustive()
    }
}

impl CategoryBindings {
    /// Apply overrides on top of the defaults.
    pub fn from_overrides(overrides: &BindingOverrides) -> Self {
        let mut bindings = Self::default();
        if let Some(id) = &overrides.id_attribute {
            bindings.id_attribute = id.clone();
            // The partition attribute follows the id attribute unless
            // overridden on its own.
            bindings.partition_attribute = id.clone();
        }
        if let Some(schedule) = &overrides.schedule_attribute {
            bindings.schedule_attribute = schedule.clone();
        }
        if let Some(last_execution) = &overrides.last_execution_attribute {
            bindings.last_execution_attribute = last_execution.clone();
        }
        if let Some(partition) = &overrides.partition_attribute {
            bindings.partition_attribute = partition.clone();
        }
        if let Some(state) = &overrides.state_attribute {
            bindings.state_attribute = state.clone();
        }
        bindings
    }

    /// Replace the state value mapping function.
    pub fn with_state_value_mapper(mut self, mapper: StateValueMapper) -> Self {
        self.state_value_mapper = mapper;
        self
    }

    fn validate(&self, category: &str) -> Result<()> {
        let fields = [
            ("id", &self.id_attribute),
            ("schedule", &self.schedule_attribute),
            ("last execution", &self.last_execution_attribute),
            ("partition", &self.partition_attribute),
            ("state", &self.state_attribute),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::InvalidBindings(format!(
                    "{category} {field} attribute name is empty"
                )));
            }
        }
        Ok(())
    }
}

/// Attribute bindings for both partition key categories.
#[derive(Debug, Clone, Default)]
pub struct AttributeBindings {
    pub trigger: CategoryBindings,
    pub instance: CategoryBindings,
}

impl AttributeBindings {
    /// Resolve bindings from per-category overrides.
    pub fn from_overrides(trigger: &BindingOverrides, instance: &BindingOverrides) -> Self {
        Self {
            trigger: CategoryBindings::from_overrides(trigger),
            instance: CategoryBindings::from_overrides(instance),
        }
    }

    /// Reject unusable bindings before any computation runs.
    pub fn validate(&self) -> Result<()> {
        self.trigger.validate("trigger")?;
        self.instance.validate("instance")
    }
}
