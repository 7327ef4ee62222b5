pub mod document;
pub mod metadata;
pub mod store;

use anyhow::{Context, Result};
use std::path::Path;

pub use document::{load, save, RegistryDocument};
pub use store::{RegisterMode, RegistryStore};

use crate::config::RegistryConfig;

/// Live existence check; unreadable paths count as missing
pub async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Create the on-disk layout and an empty registry document.
///
/// Existing directories and an existing registry file are left as they are.
pub async fn init(config: &RegistryConfig) -> Result<()> {
    for dir in config.directories() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    if !exists(&config.registry_file).await {
        save(&RegistryStore::new(), &config.registry_file)
            .await
            .context("Failed to write empty registry")?;
        tracing::info!(path = %config.registry_file.display(), "Created registry file");
    }

    Ok(())
}
