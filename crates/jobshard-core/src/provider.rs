//! Partition key provider.
//!
//! Startup entry point: reads the type catalog once, flattens the
//! hierarchy, and builds the two immutable partition key collections the
//! job execution engine polls for the rest of the process lifetime. Any
//! failure here aborts system bring-up; there are no partial results and
//! nothing is retried.

use crate::catalog::{CatalogSource, TypeCatalog};
use crate::flatten::flatten;
use crate::partition::{build_partition_keys, PartitionKey, PartitionKeySet};
use jobshard_common::Result;
use jobshard_config::AttributeBindings;
use tracing::debug;

/// Computes and holds the partition keys for one storage configuration.
#[derive(Debug, Clone)]
pub struct PartitionKeyProvider {
    keys: PartitionKeySet,
}

impl PartitionKeyProvider {
    /// Compute partition keys from a catalog source and attribute
    /// bindings. Runs the whole computation up front.
    pub fn new(source: &dyn CatalogSource, bindings: AttributeBindings) -> Result<Self> {
        bindings.validate()?;
        let catalog = TypeCatalog::new(source.list_types()?)?;
        debug!(types = catalog.len(), "type catalog loaded");
        let coverage = flatten(&catalog);
        let keys = build_partition_keys(&coverage, &catalog, &bindings)?;
        Ok(Self { keys })
    }

    /// Partition keys for job trigger types, ordered by name.
    pub fn trigger_partition_keys(&self) -> &[PartitionKey] {
        &self.keys.trigger_keys
    }

    /// Partition keys for job instance types, ordered by name.
    pub fn instance_partition_keys(&self) -> &[PartitionKey] {
        &self.keys.instance_keys
    }

    /// Consume the provider, yielding the owned key collections.
    pub fn into_keys(self) -> PartitionKeySet {
        self.keys
    }
}
