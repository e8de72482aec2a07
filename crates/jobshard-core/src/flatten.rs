//! Hierarchy flattening.
//!
//! Walks the type catalog once and computes, for every non-abstract type
//! whose storage region holds schedulable rows, the ordered list of
//! concrete schedulable types that region must account for: the type
//! itself (when schedulable) plus every concrete schedulable descendant.
//! Abstract types are transparent: they never key an entry and never stop
//! a walk short of the hierarchy root.

use crate::catalog::TypeCatalog;
use std::collections::BTreeMap;
use tracing::trace;

/// Mapping from representative type name to the concrete schedulable types
/// covered by its storage region, in stable order (self first, then
/// descendants in name order).
pub type CoverageMap = BTreeMap<String, Vec<String>>;

/// Flatten the catalog into per-representative coverage lists.
///
/// Every concrete schedulable type seeds its own entry, then climbs its
/// supertype chain and merges itself into the entry of each non-abstract
/// ancestor. The walk ends at the hierarchy root or at a supertype the
/// catalog does not know (a foreign framework base). Entries accumulate
/// across branches, so an ancestor below several abstract boundaries still
/// ends up with the union of all its concrete schedulable descendants.
pub fn flatten(catalog: &TypeCatalog) -> CoverageMap {
    let mut coverage = CoverageMap::new();

    // Types are always covered by themselves.
    for descriptor in catalog.types().filter(|t| t.is_schedulable()) {
        coverage.insert(descriptor.name.clone(), vec![descriptor.name.clone()]);
    }

    for leaf in catalog.types().filter(|t| t.is_schedulable()) {
        let mut current = leaf;
        while let Some(ancestor) = catalog.supertype_of(current) {
            if !ancestor.is_abstract {
                let entry = coverage.entry(ancestor.name.clone()).or_default();
                if !entry.contains(&leaf.name) {
                    trace!(
                        descendant = %leaf.name,
                        region = %ancestor.name,
                        "descendant shares ancestor storage region"
                    );
                    entry.push(leaf.name.clone());
                }
            }
            current = ancestor;
        }
    }

    coverage
}
