//! Integration-safety check
//!
//! Pure with respect to the registry: it reads the filesystem but never
//! mutates a record. The lifecycle transition happens in the caller.

use std::io;
use std::path::Path;

use crate::component::ComponentRecord;
use crate::conflict::{self, find_markers, substring_conflict};
use crate::error::RegistryError;
use crate::resolver;
use crate::storage::{self, RegistryStore};

#[derive(Debug, Default)]
pub struct IntegrationReport {
    pub errors: Vec<RegistryError>,
    /// Non-blocking findings (dependency cycles)
    pub warnings: Vec<String>,
    /// Injection markers found in the target
    pub found_markers: Vec<String>,
}

impl IntegrationReport {
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn has(&self, kind: &str) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }
}

/// Run every integration-safety check for `record` against `target`.
///
/// All checks are attempted; a failing one does not hide the others, except
/// that marker and namespace checks need the target's contents.
pub async fn check(
    store: &RegistryStore,
    record: &ComponentRecord,
    target: &Path,
) -> IntegrationReport {
    let mut report = IntegrationReport::default();

    let location = record.location();
    if !storage::exists(location).await {
        report.errors.push(RegistryError::file_access(
            location,
            io::Error::new(io::ErrorKind::NotFound, "component folder does not exist"),
        ));
    }

    match conflict::read_target(target).await {
        Ok(contents) => {
            if substring_conflict(&record.css_namespace, &contents) {
                report.errors.push(RegistryError::NamespaceConflict {
                    namespace: record.css_namespace.clone(),
                    owner: target.display().to_string(),
                });
            }

            report.found_markers = find_markers(&record.name, &contents);
            if report.found_markers.is_empty() {
                report.errors.push(RegistryError::MissingMarkers {
                    target: target.display().to_string(),
                });
            }
        }
        Err(e) => report.errors.push(e),
    }

    for dep in resolver::unresolved(store, &record.dependencies) {
        report.errors.push(RegistryError::MissingDependency(dep));
    }

    if let Some(cycle) = resolver::find_cycle(store, &record.name) {
        report
            .warnings
            .push(format!("Dependency cycle: {}", cycle.join(" -> ")));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentSpec;
    use crate::storage::RegisterMode;
    use chrono::Utc;
    use tempfile::TempDir;

    async fn fixture(
        deps: &[&str],
        target_html: &str,
    ) -> (TempDir, RegistryStore, ComponentRecord) {
        let dir = TempDir::new().unwrap();
        let comp_dir = dir.path().join("btn");
        tokio::fs::create_dir_all(&comp_dir).await.unwrap();
        tokio::fs::write(dir.path().join("index.html"), target_html).await.unwrap();

        let spec = ComponentSpec::new("btn", ".c-btn").with_dependencies(deps.iter().copied());
        let record = ComponentRecord::new(spec, comp_dir, Utc::now());
        let mut store = RegistryStore::new();
        store.insert(record.clone(), RegisterMode::CreateOnly).unwrap();
        (dir, store, record)
    }

    #[tokio::test]
    async fn test_clean_target_is_valid() {
        let (dir, store, record) = fixture(&[], "<body><!-- INJECT:btn:HTML --></body>").await;
        let report = check(&store, &record, &dir.path().join("index.html")).await;

        assert!(report.valid(), "{:?}", report.messages());
        assert_eq!(report.found_markers, vec!["<!-- INJECT:btn:HTML -->"]);
    }

    #[tokio::test]
    async fn test_every_failure_is_reported() {
        let (dir, store, record) =
            fixture(&["missing-dep"], "<style>.c-btn-group{}</style>").await;
        let report = check(&store, &record, &dir.path().join("index.html")).await;

        assert!(!report.valid());
        assert!(report.has("NamespaceConflict"));
        assert!(report.has("MissingMarkers"));
        assert!(report.has("MissingDependency"));
        assert!(report
            .messages()
            .iter()
            .any(|m| m == "Missing dependency: missing-dep"));
    }

    #[tokio::test]
    async fn test_unreadable_target() {
        let (dir, store, record) = fixture(&[], "").await;
        let report = check(&store, &record, &dir.path().join("absent.html")).await;

        assert!(report.has("FileAccessError"));
        assert!(!report.has("MissingMarkers"));
    }

    #[tokio::test]
    async fn test_self_dependency_only_warns() {
        let (dir, store, record) = fixture(&["btn"], "// INJECT:btn:JS").await;
        let report = check(&store, &record, &dir.path().join("index.html")).await;

        assert!(report.valid());
        assert_eq!(report.warnings, vec!["Dependency cycle: btn -> btn"]);
    }
}
