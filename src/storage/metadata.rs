//! Per-component `metadata.json` kept next to the component's files.
//!
//! The registry does not create this file. When one exists, proving the
//! component stamps the lifecycle fields into it and leaves every other key
//! alone.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::exists;
use crate::component::ComponentRecord;
use crate::error::{RegistryError, Result};

pub const METADATA_FILE: &str = "metadata.json";

pub fn metadata_path(record: &ComponentRecord) -> PathBuf {
    record.location().join(METADATA_FILE)
}

/// Update the metadata file of a proven component.
///
/// Returns the path written, or `None` when the component has no metadata file.
pub async fn write_proven(record: &ComponentRecord, now: DateTime<Utc>) -> Result<Option<PathBuf>> {
    let path = metadata_path(record);
    if !exists(&path).await {
        return Ok(None);
    }

    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| RegistryError::file_access(&path, e))?;
    let mut metadata: Value = serde_json::from_str(&raw).map_err(|e| {
        RegistryError::file_access(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;

    let updates = json!({
        "validated": record.validated,
        "integrated": record.integrated,
        "status": record.status,
        "updatedAt": now,
    });

    match (&mut metadata, updates) {
        (Value::Object(existing), Value::Object(fields)) => existing.extend(fields),
        (_, fields) => metadata = fields,
    }

    let out = serde_json::to_string_pretty(&metadata)
        .map_err(|e| RegistryError::Persistence(e.to_string()))?;
    tokio::fs::write(&path, out)
        .await
        .map_err(|e| RegistryError::file_access(&path, e))?;

    Ok(Some(path))
}
