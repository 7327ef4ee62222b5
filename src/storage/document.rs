//! Persisted registry document
//!
//! The whole store is rewritten on every mutation:
//!
//! ```json
//! { "version": "1.0.0", "updated": "...", "components": { "btn": { ... } } }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::store::RegistryStore;
use crate::component::ComponentRecord;
use crate::error::{RegistryError, Result};

pub const DOCUMENT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub version: String,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentRecord>,
}

impl RegistryDocument {
    pub fn from_store(store: &RegistryStore) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            updated: Utc::now(),
            components: store
                .records()
                .map(|r| (r.name.clone(), r.clone()))
                .collect(),
        }
    }

    pub fn into_store(self) -> RegistryStore {
        RegistryStore::from_records(self.components.into_values())
    }
}

/// Load the store from disk.
///
/// A missing file yields an empty store. An unparseable file is moved aside
/// to `<file>.corrupt` and an empty store is returned, so the next save does
/// not destroy it.
pub async fn load(path: &Path) -> Result<RegistryStore> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No existing registry, starting fresh");
            return Ok(RegistryStore::new());
        }
        Err(e) => return Err(RegistryError::file_access(path, e)),
    };

    match serde_json::from_slice::<RegistryDocument>(&bytes) {
        Ok(doc) => {
            let store = doc.into_store();
            tracing::info!(count = store.len(), path = %path.display(), "Loaded registry");
            Ok(store)
        }
        Err(e) => {
            let aside = sidecar(path, "corrupt");
            tracing::error!(
                path = %path.display(),
                moved_to = %aside.display(),
                "Error loading registry: {}", e
            );
            tokio::fs::rename(path, &aside)
                .await
                .map_err(|e| RegistryError::file_access(path, e))?;
            Ok(RegistryStore::new())
        }
    }
}

/// Write the full store, via a temp file and rename.
pub async fn save(store: &RegistryStore, path: &Path) -> Result<()> {
    let doc = RegistryDocument::from_store(store);
    let json = serde_json::to_string_pretty(&doc)
        .map_err(|e| RegistryError::Persistence(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RegistryError::file_access(parent, e))?;
    }

    let tmp = sidecar(path, "tmp");
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| RegistryError::file_access(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| RegistryError::file_access(path, e))?;

    tracing::debug!(count = store.len(), path = %path.display(), "Saved registry");
    Ok(())
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
