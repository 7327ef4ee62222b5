//! Component Registry engine
//!
//! Owns the store and the configuration. Every tool of the protocol maps to
//! one method here. Methods that mutate take `&mut self`, so a caller that
//! owns the `Registry` (the server loop) is the single writer.
//!
//! Each mutation is followed by a full save. A failed save is logged and
//! surfaced as `persistenceWarning`; the in-memory change stands.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::component::{ComponentRecord, ComponentSpec, ComponentStatus};
use crate::config::RegistryConfig;
use crate::conflict;
use crate::error::{RegistryError, Result};
use crate::lifecycle;
use crate::planner::{self, IntegrationPlan};
use crate::storage::{self, metadata, RegisterMode, RegistryStore};
use crate::validation::{contract, integration, preflight, PreflightChecks};

pub const SANDBOX_INSTRUCTIONS: [&str; 5] = [
    "Open sandbox test in browser",
    "Click \"Run Test\" button",
    "Verify all checks pass",
    "Confirm visual appearance correct",
    "Mark as proven if all tests pass",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOutcome {
    pub success: bool,
    pub message: String,
    pub component: ComponentRecord,
    pub files_exist: bool,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub success: bool,
    pub valid: bool,
    pub safe_to_integrate: bool,
    pub reason: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub injection_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentList {
    pub success: bool,
    pub total: usize,
    pub components: Vec<ComponentRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub success: bool,
    #[serde(flatten)]
    pub component: ComponentRecord,
    pub files_exist: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractOutcome {
    pub success: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub contract_path: PathBuf,
    pub sections: usize,
    pub missing_sections: Vec<String>,
    pub declared_namespace: Option<String>,
    pub css_namespace_match: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightOutcome {
    pub success: bool,
    pub reason: String,
    pub checks: PreflightChecks,
    pub errors: Vec<String>,
    pub target_file: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenOutcome {
    pub success: bool,
    pub message: String,
    pub path: PathBuf,
    pub status: ComponentStatus,
    pub integrated: bool,
    pub integrated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_warning: Option<String>,
}

pub struct Registry {
    config: RegistryConfig,
    store: RegistryStore,
}

impl Registry {
    /// Load the persisted store named by `config`
    pub async fn open(config: RegistryConfig) -> Result<Self> {
        let store = storage::load(&config.registry_file).await?;
        Ok(Self { config, store })
    }

    /// Start from an existing store without touching disk
    pub fn with_store(config: RegistryConfig, store: RegistryStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    /// Write the store; `Some(reason)` on failure
    pub async fn persist(&self) -> Option<String> {
        match storage::save(&self.store, &self.config.registry_file).await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(
                    path = %self.config.registry_file.display(),
                    "Error saving registry: {}", e
                );
                Some(e.to_string())
            }
        }
    }

    /// Register a component. `mode` falls back to the configured default.
    pub async fn register_component(
        &mut self,
        spec: ComponentSpec,
        mode: Option<RegisterMode>,
    ) -> Result<RegisterOutcome> {
        spec.check_name()?;
        let mode = mode.unwrap_or_else(|| self.config.register_mode());
        let path = spec
            .filepath
            .clone()
            .unwrap_or_else(|| self.config.component_dir(&spec.name));

        let record = ComponentRecord::new(spec, path, Utc::now());
        let name = record.name.clone();
        self.store.insert(record, mode)?;

        let component = self.store.get(&name)?.clone();
        let files_exist = storage::exists(component.location()).await;
        tracing::info!(
            component = %name,
            namespace = %component.css_namespace,
            "Registered component"
        );

        let persistence_warning = self.persist().await;
        Ok(RegisterOutcome {
            success: true,
            message: format!("Component '{}' registered successfully", name),
            path: component.filepath.clone(),
            component,
            files_exist,
            persistence_warning,
        })
    }

    /// Check integration safety; on success move the record to `validated`.
    pub async fn validate_integration(
        &mut self,
        name: &str,
        target: &Path,
    ) -> Result<ValidationOutcome> {
        let record = self.store.get(name)?.clone();
        let report = integration::check(&self.store, &record, target).await;
        let valid = report.valid();

        let mut persistence_warning = None;
        if valid {
            lifecycle::mark_validated(self.store.get_mut(name)?, Utc::now());
            tracing::info!(component = %name, target = %target.display(), "Component validated");
            persistence_warning = self.persist().await;
        } else {
            tracing::warn!(component = %name, errors = report.errors.len(), "Validation failed");
        }

        let errors = report.messages();
        Ok(ValidationOutcome {
            success: valid,
            valid,
            safe_to_integrate: valid,
            reason: if valid {
                "Component ready for integration".to_string()
            } else {
                errors.join("; ")
            },
            errors,
            warnings: report.warnings,
            injection_points: report.found_markers,
            persistence_warning,
        })
    }

    pub async fn integration_plan(&self, name: &str, target: &Path) -> Result<IntegrationPlan> {
        let record = self.store.get(name)?;
        Ok(planner::plan(&self.store, record, target).await)
    }

    pub fn list_components(&self) -> ComponentList {
        let components = self.store.list();
        ComponentList {
            success: true,
            total: components.len(),
            components,
        }
    }

    pub async fn component_status(&self, name: &str) -> Result<StatusReport> {
        let component = self.store.get(name)?.clone();
        let files_exist = storage::exists(component.location()).await;
        Ok(StatusReport {
            success: true,
            component,
            files_exist,
        })
    }

    /// Validate a contract document; `contract_path` defaults to the
    /// conventional `<contracts>/<name>-contract.md`.
    pub async fn validate_contract(
        &self,
        name: &str,
        contract_path: Option<&Path>,
    ) -> Result<ContractOutcome> {
        let record = self.store.get(name)?;
        let path = contract_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.contract_path(name));

        let contents = conflict::read_target(&path).await?;
        let report = contract::inspect(&contents, &record.css_namespace);

        let (success, reason, kind) = match report.failure() {
            None => (true, "Contract is valid and matches component".to_string(), None),
            Some(reason) => {
                let err = RegistryError::ContractMalformed(reason.clone());
                (false, reason, Some(err.kind()))
            }
        };

        Ok(ContractOutcome {
            success,
            reason,
            kind,
            contract_path: path,
            sections: contract::REQUIRED_SECTIONS.len() - report.missing_sections.len(),
            css_namespace_match: report.namespace_matches(),
            missing_sections: report.missing_sections,
            declared_namespace: report.declared_namespace,
        })
    }

    /// Run all four preflight checks. Never changes lifecycle state.
    pub async fn run_preflight_checks(
        &self,
        name: &str,
        target: Option<&Path>,
    ) -> Result<PreflightOutcome> {
        let record = self.store.get(name)?;
        let target = target.unwrap_or(self.config.default_target.as_path());
        let report = preflight::run(&self.config, &self.store, record, target).await;

        Ok(PreflightOutcome {
            success: report.passed(),
            reason: report.reason(),
            checks: report.checks,
            errors: report.errors,
            target_file: target.to_path_buf(),
        })
    }

    pub async fn test_in_sandbox(&self, name: &str) -> Result<SandboxOutcome> {
        self.store.get(name)?;
        let path = self.config.sandbox_path(name);

        if storage::exists(&path).await {
            Ok(SandboxOutcome {
                success: true,
                message: Some(format!("Sandbox test ready for '{}'", name)),
                reason: None,
                instructions: SANDBOX_INSTRUCTIONS.iter().map(|s| s.to_string()).collect(),
                suggestion: None,
                path,
            })
        } else {
            Ok(SandboxOutcome {
                success: false,
                message: None,
                reason: Some(format!(
                    "No sandbox test found. Create with /prove-it-works {}",
                    name
                )),
                suggestion: Some(format!("Expected file: {}", path.display())),
                instructions: Vec::new(),
                path,
            })
        }
    }

    /// `validated → proven`. Fails with `NotValidated` and leaves the record
    /// untouched if it never passed validation.
    pub async fn mark_as_proven(&mut self, name: &str) -> Result<ProvenOutcome> {
        lifecycle::ensure_provable(self.store.get(name)?)?;

        let proven_dir = self.config.proven_path(name);
        tokio::fs::create_dir_all(&proven_dir)
            .await
            .map_err(|e| RegistryError::file_access(&proven_dir, e))?;

        let now = Utc::now();
        let record = self.store.get_mut(name)?;
        lifecycle::mark_proven(record, now)?;
        let record = record.clone();
        tracing::info!(component = %name, "Component marked as proven");

        let mut warnings = Vec::new();
        let metadata_path = match metadata::write_proven(&record, now).await {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(component = %name, "Could not update metadata: {}", e);
                warnings.push(format!("Could not update metadata: {}", e));
                None
            }
        };

        let persistence_warning = self.persist().await;
        Ok(ProvenOutcome {
            success: true,
            message: format!("Component '{}' marked as proven", name),
            path: proven_dir,
            status: record.status,
            integrated: record.integrated,
            integrated_at: record.integrated_at,
            metadata_path,
            warnings,
            persistence_warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn registry(dir: &TempDir) -> Registry {
        let config = RegistryConfig::with_root(dir.path().join(".system"));
        storage::init(&config).await.unwrap();
        Registry::open(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_persists_and_defaults_filepath() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir).await;

        let out = reg
            .register_component(ComponentSpec::new("btn", ".c-btn"), None)
            .await
            .unwrap();
        assert!(out.success);
        assert!(!out.files_exist);
        assert_eq!(out.path, reg.config().component_dir("btn"));
        assert!(out.persistence_warning.is_none());

        let reloaded = storage::load(&reg.config().registry_file).await.unwrap();
        assert!(reloaded.contains("btn"));
    }

    #[tokio::test]
    async fn test_register_conflict_does_not_mutate() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir).await;
        reg.register_component(ComponentSpec::new("btn", ".c-btn"), None)
            .await
            .unwrap();

        let err = reg
            .register_component(ComponentSpec::new("btn2", ".c-btn"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NamespaceConflict");
        assert_eq!(reg.list_components().total, 1);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        // A directory where the registry file should be makes every save fail
        let mut config = RegistryConfig::with_root(dir.path());
        config.registry_file = dir.path().join("blocked");
        std::fs::create_dir_all(config.registry_file.join("inner")).unwrap();

        let mut reg = Registry::with_store(config, RegistryStore::new());
        let out = reg
            .register_component(ComponentSpec::new("btn", ".c-btn"), None)
            .await
            .unwrap();

        assert!(out.success);
        assert!(out.persistence_warning.is_some());
        assert!(reg.store().contains("btn"));
    }

    #[tokio::test]
    async fn test_sandbox_readiness() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir).await;
        reg.register_component(ComponentSpec::new("btn", ".c-btn"), None)
            .await
            .unwrap();

        let missing = reg.test_in_sandbox("btn").await.unwrap();
        assert!(!missing.success);
        assert!(missing.suggestion.unwrap().contains("btn-test.html"));

        tokio::fs::write(reg.config().sandbox_path("btn"), "<html></html>")
            .await
            .unwrap();
        let ready = reg.test_in_sandbox("btn").await.unwrap();
        assert!(ready.success);
        assert_eq!(ready.instructions.len(), 5);

        assert!(matches!(
            reg.test_in_sandbox("ghost").await,
            Err(RegistryError::ComponentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_validate_contract_against_registered_namespace() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir).await;
        reg.register_component(ComponentSpec::new("btn", ".c-btn"), None)
            .await
            .unwrap();

        let mut text = contract::REQUIRED_SECTIONS.join("\n\n");
        text.push_str("\n\nCSS Namespace: `.c-button`\n");
        tokio::fs::write(reg.config().contract_path("btn"), &text)
            .await
            .unwrap();

        let out = reg.validate_contract("btn", None).await.unwrap();
        assert!(!out.success);
        assert_eq!(out.kind, Some("ContractMalformed"));
        assert!(!out.css_namespace_match);
        assert_eq!(out.sections, 5);

        let err = reg
            .validate_contract("btn", Some(Path::new("/definitely/not/here.md")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "FileAccessError");
    }

    #[tokio::test]
    async fn test_status_reports_live_files() {
        let dir = TempDir::new().unwrap();
        let mut reg = registry(&dir).await;
        reg.register_component(ComponentSpec::new("tabs", ".c-tabs"), None)
            .await
            .unwrap();
        reg.register_component(ComponentSpec::new("alert", ".c-alert"), None)
            .await
            .unwrap();

        let before = reg.component_status("tabs").await.unwrap();
        assert!(!before.files_exist);

        tokio::fs::create_dir_all(reg.config().component_dir("tabs"))
            .await
            .unwrap();
        let after = reg.component_status("tabs").await.unwrap();
        assert!(after.files_exist);
        assert_eq!(after.component.status, ComponentStatus::Registered);

        let names: Vec<_> = reg
            .list_components()
            .components
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["alert", "tabs"]);
    }
}
