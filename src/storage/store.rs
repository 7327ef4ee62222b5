//! In-memory registry store
//!
//! Name → record map plus the active namespace set. The namespace set is
//! updated alongside every insert so it always matches the namespaces of
//! the records in the map.

use std::collections::{BTreeMap, HashMap};

use crate::component::ComponentRecord;
use crate::conflict;
use crate::error::{RegistryError, Result};

/// What to do when registering a name that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterMode {
    /// Fail with `DuplicateName`
    #[default]
    CreateOnly,
    /// Replace the existing record
    Upsert,
}

#[derive(Debug, Clone, Default)]
pub struct RegistryStore {
    components: BTreeMap<String, ComponentRecord>,
    /// namespace → owning component name
    namespaces: HashMap<String, String>,
}

impl RegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted records, deriving the namespace set.
    pub fn from_records(records: impl IntoIterator<Item = ComponentRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store
                .namespaces
                .insert(record.css_namespace.clone(), record.name.clone());
            store.components.insert(record.name.clone(), record);
        }
        store
    }

    /// Insert a record. On error the store is left untouched.
    ///
    /// An upsert keeps the lifecycle of the record it replaces (status,
    /// flags and every timestamp); only namespace, dependencies and
    /// filepath come from `record`.
    pub fn insert(&mut self, mut record: ComponentRecord, mode: RegisterMode) -> Result<()> {
        if mode == RegisterMode::CreateOnly && self.components.contains_key(&record.name) {
            return Err(RegistryError::DuplicateName(record.name));
        }

        if let Some(owner) = conflict::namespace_conflict(self, &record.css_namespace, &record.name)
        {
            return Err(RegistryError::NamespaceConflict {
                namespace: record.css_namespace,
                owner: owner.to_string(),
            });
        }

        if let Some(previous) = self.components.remove(&record.name) {
            self.namespaces.remove(&previous.css_namespace);
            record.status = previous.status;
            record.validated = previous.validated;
            record.integrated = previous.integrated;
            record.registered_at = previous.registered_at;
            record.validated_at = previous.validated_at;
            record.integrated_at = previous.integrated_at;
        }

        self.namespaces
            .insert(record.css_namespace.clone(), record.name.clone());
        self.components.insert(record.name.clone(), record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&ComponentRecord> {
        self.components
            .get(name)
            .ok_or_else(|| RegistryError::ComponentNotFound(name.to_string()))
    }

    /// Mutable access for lifecycle transitions. Namespace and name are not
    /// meant to change through this handle.
    pub(crate) fn get_mut(&mut self, name: &str) -> Result<&mut ComponentRecord> {
        self.components
            .get_mut(name)
            .ok_or_else(|| RegistryError::ComponentNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Snapshot of all records, sorted by name
    pub fn list(&self) -> Vec<ComponentRecord> {
        self.components.values().cloned().collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &ComponentRecord> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// True if an active record already declares exactly this namespace
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    pub fn namespace_owner(&self, namespace: &str) -> Option<&str> {
        self.namespaces.get(namespace).map(String::as_str)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Dependency names of a record, used by the resolver's graph walk
    pub fn dependencies_of(&self, name: &str) -> Option<&[String]> {
        self.components.get(name).map(|r| r.dependencies.as_slice())
    }
}
