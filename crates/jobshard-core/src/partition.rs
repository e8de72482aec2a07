//! Partition keys.
//!
//! A partition key names one concrete schedulable type, carries the
//! storage attribute bindings the execution engine queries by, and, when
//! the type's storage region also holds rows of concrete schedulable
//! subtypes, a type-discriminating predicate fragment that isolates rows
//! of exactly that type.

use crate::catalog::TypeCatalog;
use crate::flatten::CoverageMap;
use jobshard_common::{Category, Error, JobState, Result};
use jobshard_config::{AttributeBindings, CategoryBindings, StateValueMapper};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// Type-discriminating predicate fragment.
///
/// Rendered against a query alias, the fragment asserts that the runtime
/// type of the row at that alias is exactly the named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypePredicate {
    type_name: String,
}

impl TypePredicate {
    /// Predicate isolating rows of the named type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    /// The type the fragment discriminates on.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Render the fragment for a query alias.
    pub fn render(&self, alias: &str) -> String {
        format!("TYPE({alias}) = {}", self.type_name)
    }
}

/// Queryable partition descriptor for one concrete schedulable type.
///
/// Immutable after construction; the execution engine reads these from
/// multiple threads without synchronization.
#[derive(Clone)]
pub struct PartitionKey {
    name: String,
    category: Category,
    id_attribute: String,
    schedule_attribute: String,
    last_execution_attribute: String,
    partition_attribute: String,
    state_attribute: String,
    state_value_mapper: StateValueMapper,
    predicate: Option<TypePredicate>,
}

impl PartitionKey {
    /// Start building a partition key.
    pub fn builder() -> PartitionKeyBuilder {
        PartitionKeyBuilder::default()
    }

    /// The represented type's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trigger or instance.
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    pub fn schedule_attribute(&self) -> &str {
        &self.schedule_attribute
    }

    pub fn last_execution_attribute(&self) -> &str {
        &self.last_execution_attribute
    }

    pub fn partition_attribute(&self) -> &str {
        &self.partition_attribute
    }

    pub fn state_attribute(&self) -> &str {
        &self.state_attribute
    }

    /// Map the abstract job state to the storage-native value.
    pub fn map_state_value(&self, state: JobState) -> Value {
        (self.state_value_mapper)(state)
    }

    /// The type-discriminating predicate, present only when this key's
    /// storage region also holds subtype rows.
    pub fn predicate(&self) -> Option<&TypePredicate> {
        self.predicate.as_ref()
    }
}

impl fmt::Debug for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionKey")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("id_attribute", &self.id_attribute)
            .field("schedule_attribute", &self.schedule_attribute)
            .field("last_execution_attribute", &self.last_execution_attribute)
            .field("partition_attribute", &self.partition_attribute)
            .field("state_attribute", &self.state_attribute)
            .field("predicate", &self.predicate)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PartitionKey`].
#[derive(Default)]
pub struct PartitionKeyBuilder {
    name: Option<String>,
    category: Option<Category>,
    bindings: Option<CategoryBindings>,
    predicate: Option<TypePredicate>,
}

impl PartitionKeyBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Take all attribute names and the state value mapper from resolved
    /// category bindings.
    pub fn bindings(mut self, bindings: &CategoryBindings) -> Self {
        self.bindings = Some(bindings.clone());
        self
    }

    pub fn predicate(mut self, predicate: TypePredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Finish the key. Missing name, category, or bindings abort the whole
    /// computation, as does a category outside trigger/instance.
    pub fn build(self) -> Result<PartitionKey> {
        let name = self
            .name
            .ok_or_else(|| Error::Config("partition key name not set".to_string()))?;
        let category = self
            .category
            .ok_or_else(|| Error::Config(format!("partition key {name} has no category")))?;
        if !category.participates() {
            return Err(Error::Config(format!(
                "partition key {name} must be a trigger or instance key"
            )));
        }
        let bindings = self
            .bindings
            .ok_or_else(|| Error::Config(format!("partition key {name} has no bindings")))?;

        Ok(PartitionKey {
            name,
            category,
            id_attribute: bindings.id_attribute,
            schedule_attribute: bindings.schedule_attribute,
            last_execution_attribute: bindings.last_execution_attribute,
            partition_attribute: bindings.partition_attribute,
            state_attribute: bindings.state_attribute,
            state_value_mapper: bindings.state_value_mapper,
            predicate: self.predicate,
        })
    }
}

/// The two output collections, ordered by key name.
#[derive(Debug, Clone, Default)]
pub struct PartitionKeySet {
    pub trigger_keys: Vec<PartitionKey>,
    pub instance_keys: Vec<PartitionKey>,
}

impl PartitionKeySet {
    /// Total number of keys across both collections.
    pub fn len(&self) -> usize {
        self.trigger_keys.len() + self.instance_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trigger_keys.is_empty() && self.instance_keys.is_empty()
    }
}

/// Build partition keys from flattened coverage.
///
/// One key per schedulable representative, split into the trigger and
/// instance collections. The predicate is attached only when the
/// representative's region also holds subtype rows. Entries whose
/// representative is not schedulable yield no key: each of their
/// schedulable descendants is reachable through its own key.
pub fn build_partition_keys(
    coverage: &CoverageMap,
    catalog: &TypeCatalog,
    bindings: &AttributeBindings,
) -> Result<PartitionKeySet> {
    let mut keys = PartitionKeySet::default();

    for (name, covered) in coverage {
        let descriptor = catalog.get(name).ok_or_else(|| {
            Error::Config(format!("coverage entry {name} is missing from the catalog"))
        })?;

        let category_bindings = match descriptor.category {
            Category::Trigger => &bindings.trigger,
            Category::Instance => &bindings.instance,
            Category::Neither => {
                debug!(
                    type_name = %name,
                    covered = covered.len(),
                    "region has no schedulable representative, no key emitted"
                );
                continue;
            }
        };

        let mut builder = PartitionKey::builder()
            .name(name.clone())
            .category(descriptor.category)
            .bindings(category_bindings);
        if covered.len() > 1 {
            builder = builder.predicate(TypePredicate::new(name.clone()));
        }
        let key = builder.build()?;

        debug!(
            key = %key.name(),
            category = %key.category(),
            discriminated = key.predicate().is_some(),
            "partition key built"
        );
        if descriptor.category == Category::Trigger {
            keys.trigger_keys.push(key);
        } else {
            keys.instance_keys.push(key);
        }
    }

    info!(
        triggers = keys.trigger_keys.len(),
        instances = keys.instance_keys.len(),
        "partition keys computed"
    );
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeDescriptor;
    use crate::flatten::flatten;

    fn catalog(descriptors: Vec<TypeDescriptor>) -> TypeCatalog {
        TypeCatalog::new(descriptors).unwrap()
    }

    fn build(catalog: &TypeCatalog) -> PartitionKeySet {
        let coverage = flatten(catalog);
        build_partition_keys(&coverage, catalog, &AttributeBindings::default()).unwrap()
    }

    #[test]
    fn test_predicate_fragment_format() {
        let predicate = TypePredicate::new("NightlyBatchJob");
        assert_eq!(predicate.render("job"), "TYPE(job) = NightlyBatchJob");
    }

    #[test]
    fn test_builder_requires_name_category_bindings() {
        assert!(PartitionKey::builder().build().is_err());
        assert!(PartitionKey::builder().name("EmailJob").build().is_err());
        assert!(PartitionKey::builder()
            .name("EmailJob")
            .category(Category::Instance)
            .build()
            .is_err());
    }

    #[test]
    fn test_builder_rejects_neither_category() {
        let err = PartitionKey::builder()
            .name("AuditLog")
            .category(Category::Neither)
            .bindings(&CategoryBindings::default())
            .build()
            .unwrap_err();
        assert_eq!(err.code(), 10);
    }

    #[test]
    fn test_keys_split_by_category() {
        let keys = build(&catalog(vec![
            TypeDescriptor::concrete("CronTrigger", None, Category::Trigger),
            TypeDescriptor::concrete("EmailJob", None, Category::Instance),
            TypeDescriptor::concrete("ReportJob", None, Category::Instance),
        ]));
        assert_eq!(keys.trigger_keys.len(), 1);
        assert_eq!(keys.instance_keys.len(), 2);
        assert_eq!(keys.trigger_keys[0].name(), "CronTrigger");
        assert_eq!(keys.instance_keys[0].name(), "EmailJob");
        assert_eq!(keys.instance_keys[1].name(), "ReportJob");
    }

    #[test]
    fn test_predicate_only_on_shared_regions() {
        let keys = build(&catalog(vec![
            TypeDescriptor::concrete("BatchJob", None, Category::Instance),
            TypeDescriptor::concrete("NightlyBatchJob", Some("BatchJob"), Category::Instance),
        ]));
        let batch = keys
            .instance_keys
            .iter()
            .find(|k| k.name() == "BatchJob")
            .unwrap();
        let nightly = keys
            .instance_keys
            .iter()
            .find(|k| k.name() == "NightlyBatchJob")
            .unwrap();
        assert_eq!(
            batch.predicate().unwrap().render("e"),
            "TYPE(e) = BatchJob"
        );
        assert!(nightly.predicate().is_none());
    }

    #[test]
    fn test_default_bindings_on_built_keys() {
        let keys = build(&catalog(vec![TypeDescriptor::concrete(
            "CronTrigger",
            None,
            Category::Trigger,
        )]));
        let key = &keys.trigger_keys[0];
        assert_eq!(key.id_attribute(), "id");
        assert_eq!(key.schedule_attribute(), "scheduleTime");
        assert_eq!(key.last_execution_attribute(), "lastExecutionTime");
        assert_eq!(key.partition_attribute(), "id");
        assert_eq!(key.state_attribute(), "state");
        assert_eq!(
            key.map_state_value(JobState::New),
            serde_json::json!("new")
        );
    }

    #[test]
    fn test_non_schedulable_representative_skipped() {
        let keys = build(&catalog(vec![
            TypeDescriptor::concrete("AuditedRecord", None, Category::Neither),
            TypeDescriptor::concrete("EmailJob", Some("AuditedRecord"), Category::Instance),
        ]));
        assert_eq!(keys.len(), 1);
        assert_eq!(keys.instance_keys[0].name(), "EmailJob");
        // The shared region forces no predicate on the child: its own
        // region holds no subtype rows.
        assert!(keys.instance_keys[0].predicate().is_none());
    }

    #[test]
    fn test_abstract_root_yields_child_keys_only() {
        let keys = build(&catalog(vec![
            TypeDescriptor::abstract_type("BaseJob", None, Category::Neither),
            TypeDescriptor::concrete("EmailJob", Some("BaseJob"), Category::Instance),
            TypeDescriptor::concrete("ReportJob", Some("BaseJob"), Category::Instance),
        ]));
        assert_eq!(keys.instance_keys.len(), 2);
        assert!(keys.instance_keys.iter().all(|k| k.predicate().is_none()));
    }

    #[test]
    fn test_instance_partition_attribute_override() {
        let catalog = catalog(vec![TypeDescriptor::concrete(
            "EmailJob",
            None,
            Category::Instance,
        )]);
        let coverage = flatten(&catalog);
        let bindings = AttributeBindings::from_overrides(
            &Default::default(),
            &jobshard_config::BindingOverrides {
                partition_attribute: Some("tenantId".to_string()),
                ..Default::default()
            },
        );
        let keys = build_partition_keys(&coverage, &catalog, &bindings).unwrap();
        assert_eq!(keys.instance_keys[0].partition_attribute(), "tenantId");
        assert_eq!(keys.instance_keys[0].id_attribute(), "id");
    }
}
