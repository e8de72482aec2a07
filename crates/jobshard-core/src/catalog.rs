//! Record type catalog.
//!
//! The catalog is the read-only input to partition key computation: every
//! record type known to the storage layer, its abstractness, its supertype
//! link, and its marker category. Supertype chains mirror a language-level
//! inheritance hierarchy and are validated to be finite and acyclic.

use jobshard_common::{Category, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One record type known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Unique type name; doubles as the partition key name downstream.
    pub name: String,

    /// Abstract types are transparent for coverage and never become keys.
    pub is_abstract: bool,

    /// Supertype name, if any. A name that does not resolve within the
    /// catalog marks the boundary to a foreign framework base type.
    #[serde(default)]
    pub supertype: Option<String>,

    /// Marker classification, assigned once by the catalog provider.
    pub category: Category,
}

impl TypeDescriptor {
    /// Create a concrete descriptor.
    pub fn concrete(name: impl Into<String>, supertype: Option<&str>, category: Category) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            supertype: supertype.map(str::to_string),
            category,
        }
    }

    /// Create an abstract descriptor.
    pub fn abstract_type(
        name: impl Into<String>,
        supertype: Option<&str>,
        category: Category,
    ) -> Self {
        Self {
            name: name.into(),
            is_abstract: true,
            supertype: supertype.map(str::to_string),
            category,
        }
    }

    /// Whether this type is a concrete, schedulable work item type.
    pub fn is_schedulable(&self) -> bool {
        !self.is_abstract && self.category.participates()
    }
}

/// Raw catalog entry as reported by a metamodel introspector, before
/// classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerEntry {
    pub name: String,
    pub is_abstract: bool,
    #[serde(default)]
    pub supertype: Option<String>,
    pub is_trigger: bool,
    pub is_instance: bool,
}

/// Read-only catalog of record types, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: BTreeMap<String, TypeDescriptor>,
}

impl TypeCatalog {
    /// Build a catalog, enforcing unique names and acyclic supertype
    /// chains. Supertype names that do not resolve are kept as-is; they
    /// terminate upward walks at the catalog boundary.
    pub fn new(descriptors: Vec<TypeDescriptor>) -> Result<Self> {
        let mut types = BTreeMap::new();
        for descriptor in descriptors {
            let name = descriptor.name.clone();
            if types.insert(name.clone(), descriptor).is_some() {
                return Err(Error::DuplicateType(name));
            }
        }
        let catalog = Self { types };
        catalog.check_acyclic()?;
        Ok(catalog)
    }

    /// Build a catalog from raw capability markers.
    ///
    /// This is the path a metamodel introspector uses: every entry is
    /// classified from its markers (a type claiming both is rejected) and
    /// every named supertype must resolve within the entries.
    pub fn from_markers(entries: Vec<MarkerEntry>) -> Result<Self> {
        let known: BTreeSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        for entry in &entries {
            if let Some(supertype) = &entry.supertype {
                if !known.contains(supertype.as_str()) {
                    return Err(Error::UnknownSupertype {
                        type_name: entry.name.clone(),
                        supertype: supertype.clone(),
                    });
                }
            }
        }

        let mut descriptors = Vec::with_capacity(entries.len());
        for entry in entries {
            let category = Category::from_markers(entry.is_trigger, entry.is_instance, &entry.name)?;
            descriptors.push(TypeDescriptor {
                name: entry.name,
                is_abstract: entry.is_abstract,
                supertype: entry.supertype,
                category,
            });
        }
        Self::new(descriptors)
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Iterate all descriptors in name order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Number of known types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Supertype descriptor of `descriptor`, when it resolves in-catalog.
    pub fn supertype_of(&self, descriptor: &TypeDescriptor) -> Option<&TypeDescriptor> {
        descriptor
            .supertype
            .as_deref()
            .and_then(|name| self.types.get(name))
    }

    fn check_acyclic(&self) -> Result<()> {
        for start in self.types.values() {
            let mut seen = BTreeSet::new();
            seen.insert(start.name.as_str());
            let mut current = start;
            while let Some(supertype) = self.supertype_of(current) {
                if !seen.insert(supertype.name.as_str()) {
                    return Err(Error::CyclicHierarchy {
                        type_name: start.name.clone(),
                    });
                }
                current = supertype;
            }
        }
        Ok(())
    }
}

/// Read-only access to the record type catalog.
///
/// Implemented by whatever owns the storage metamodel. The partition key
/// provider treats it as an opaque snapshot; a failure here means the
/// system cannot start.
pub trait CatalogSource {
    /// List every known record type.
    fn list_types(&self) -> Result<Vec<TypeDescriptor>>;
}

impl CatalogSource for TypeCatalog {
    fn list_types(&self) -> Result<Vec<TypeDescriptor>> {
        Ok(self.types.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_rejected() {
        let err = TypeCatalog::new(vec![
            TypeDescriptor::concrete("Job", None, Category::Instance),
            TypeDescriptor::concrete("Job", None, Category::Trigger),
        ])
        .unwrap_err();
        assert_eq!(err.code(), 23);
    }

    #[test]
    fn test_cycle_rejected() {
        let err = TypeCatalog::new(vec![
            TypeDescriptor::concrete("A", Some("B"), Category::Instance),
            TypeDescriptor::concrete("B", Some("A"), Category::Neither),
        ])
        .unwrap_err();
        assert_eq!(err.code(), 22);
    }

    #[test]
    fn test_self_cycle_rejected() {
        let err = TypeCatalog::new(vec![TypeDescriptor::concrete(
            "A",
            Some("A"),
            Category::Instance,
        )])
        .unwrap_err();
        assert_eq!(err.code(), 22);
    }

    #[test]
    fn test_foreign_supertype_terminates_chain() {
        let catalog = TypeCatalog::new(vec![TypeDescriptor::concrete(
            "EmailJob",
            Some("FrameworkBase"),
            Category::Instance,
        )])
        .unwrap();
        let descriptor = catalog.get("EmailJob").unwrap();
        assert!(catalog.supertype_of(descriptor).is_none());
    }

    #[test]
    fn test_supertype_resolution() {
        let catalog = TypeCatalog::new(vec![
            TypeDescriptor::abstract_type("BaseJob", None, Category::Neither),
            TypeDescriptor::concrete("EmailJob", Some("BaseJob"), Category::Instance),
        ])
        .unwrap();
        let email = catalog.get("EmailJob").unwrap();
        assert_eq!(catalog.supertype_of(email).unwrap().name, "BaseJob");
    }

    #[test]
    fn test_from_markers_classifies() {
        let catalog = TypeCatalog::from_markers(vec![
            MarkerEntry {
                name: "EmailTrigger".to_string(),
                is_abstract: false,
                supertype: None,
                is_trigger: true,
                is_instance: false,
            },
            MarkerEntry {
                name: "EmailJob".to_string(),
                is_abstract: false,
                supertype: None,
                is_trigger: false,
                is_instance: true,
            },
        ])
        .unwrap();
        assert_eq!(
            catalog.get("EmailTrigger").unwrap().category,
            Category::Trigger
        );
        assert_eq!(catalog.get("EmailJob").unwrap().category, Category::Instance);
    }

    #[test]
    fn test_from_markers_rejects_both_markers() {
        let err = TypeCatalog::from_markers(vec![MarkerEntry {
            name: "Confused".to_string(),
            is_abstract: false,
            supertype: None,
            is_trigger: true,
            is_instance: true,
        }])
        .unwrap_err();
        assert_eq!(err.code(), 20);
    }

    #[test]
    fn test_from_markers_requires_known_supertype() {
        let err = TypeCatalog::from_markers(vec![MarkerEntry {
            name: "EmailJob".to_string(),
            is_abstract: false,
            supertype: Some("Missing".to_string()),
            is_trigger: false,
            is_instance: true,
        }])
        .unwrap_err();
        assert_eq!(err.code(), 21);
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_is_schedulable() {
        let concrete = TypeDescriptor::concrete("A", None, Category::Trigger);
        let neither = TypeDescriptor::concrete("B", None, Category::Neither);
        let abstract_trigger = TypeDescriptor::abstract_type("C", None, Category::Trigger);
        assert!(concrete.is_schedulable());
        assert!(!neither.is_schedulable());
        assert!(!abstract_trigger.is_schedulable());
    }
}
