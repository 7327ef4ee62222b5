//! Integration planning
//!
//! Advisory only: the plan lists what an injector should do, and this crate
//! never touches the target file.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::component::ComponentRecord;
use crate::conflict;
use crate::resolver;
use crate::storage::RegistryStore;

pub const INTEGRATION_STEPS: [&str; 7] = [
    "Backup target file to references/",
    "Verify all dependencies are registered",
    "Check injection markers exist in target",
    "Validate CSS namespace conflicts",
    "Inject component code at markers",
    "Mark component as integrated",
    "Validate final output",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationPlan {
    pub component_name: String,
    pub target_file: PathBuf,
    pub injection_points: Vec<String>,
    pub existing_markers: Vec<String>,
    pub missing_markers: Vec<String>,
    pub css_namespace: String,
    pub dependencies: Vec<String>,
    pub unresolved_dependencies: Vec<String>,
    pub integration_steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_error: Option<String>,
}

pub async fn plan(
    store: &RegistryStore,
    record: &ComponentRecord,
    target: &Path,
) -> IntegrationPlan {
    let injection_points = conflict::expected_markers(&record.name);

    let (existing_markers, target_error) = match conflict::read_target(target).await {
        Ok(contents) => (conflict::find_markers(&record.name, &contents), None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };

    let missing_markers = injection_points
        .iter()
        .filter(|m| !existing_markers.contains(m))
        .cloned()
        .collect();

    IntegrationPlan {
        component_name: record.name.clone(),
        target_file: target.to_path_buf(),
        injection_points,
        existing_markers,
        missing_markers,
        css_namespace: record.css_namespace.clone(),
        dependencies: record.dependencies.clone(),
        unresolved_dependencies: resolver::unresolved(store, &record.dependencies),
        integration_steps: INTEGRATION_STEPS.iter().map(|s| s.to_string()).collect(),
        target_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentSpec;
    use crate::storage::RegisterMode;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_plan_lists_markers_and_steps() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("index.html");
        tokio::fs::write(&target, "<!-- INJECT:card:HTML -->\n/* INJECT:card:CSS */")
            .await
            .unwrap();

        let spec = ComponentSpec::new("card", ".c-card").with_dependencies(["btn"]);
        let record = ComponentRecord::new(spec, dir.path().join("card"), Utc::now());
        let mut store = RegistryStore::new();
        store.insert(record.clone(), RegisterMode::CreateOnly).unwrap();

        let plan = plan(&store, &record, &target).await;
        assert_eq!(plan.injection_points.len(), 3);
        assert_eq!(plan.existing_markers.len(), 2);
        assert_eq!(plan.missing_markers, vec!["// INJECT:card:JS"]);
        assert_eq!(plan.unresolved_dependencies, vec!["btn"]);
        assert_eq!(
            plan.integration_steps.first().map(String::as_str),
            Some("Backup target file to references/")
        );
        assert_eq!(plan.integration_steps.len(), 7);
        assert!(plan.target_error.is_none());
    }

    #[tokio::test]
    async fn test_plan_with_unreadable_target() {
        let dir = TempDir::new().unwrap();
        let record = ComponentRecord::new(
            ComponentSpec::new("card", ".c-card"),
            dir.path().join("card"),
            Utc::now(),
        );
        let store = RegistryStore::new();

        let plan = plan(&store, &record, &dir.path().join("missing.html")).await;
        assert!(plan.existing_markers.is_empty());
        assert_eq!(plan.missing_markers.len(), 3);
        assert!(plan.target_error.is_some());
    }
}
