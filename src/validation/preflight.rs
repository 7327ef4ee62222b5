//! Four-level preflight
//!
//! 1. the component's location exists
//! 2. `<name>.test.js` sits alongside it
//! 3. `<contracts>/<name>-contract.md` exists
//! 4. the integration-safety check passes against the target
//!
//! All four always run.

use std::path::Path;

use serde::Serialize;

use super::integration;
use crate::component::ComponentRecord;
use crate::config::RegistryConfig;
use crate::storage::{self, RegistryStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreflightChecks {
    pub exists: bool,
    pub tests: bool,
    pub contract: bool,
    pub integration: bool,
}

impl PreflightChecks {
    pub fn all_passed(&self) -> bool {
        self.exists && self.tests && self.contract && self.integration
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    pub checks: PreflightChecks,
    pub errors: Vec<String>,
}

impl PreflightReport {
    pub fn passed(&self) -> bool {
        self.checks.all_passed()
    }

    pub fn reason(&self) -> String {
        if self.passed() {
            "All pre-flight checks passed".to_string()
        } else {
            self.errors.join("; ")
        }
    }
}

pub fn test_artifact(record: &ComponentRecord) -> std::path::PathBuf {
    record.location().join(format!("{}.test.js", record.name))
}

pub async fn run(
    config: &RegistryConfig,
    store: &RegistryStore,
    record: &ComponentRecord,
    target: &Path,
) -> PreflightReport {
    let mut report = PreflightReport::default();

    report.checks.exists = storage::exists(record.location()).await;
    if !report.checks.exists {
        report.errors.push(format!(
            "Component folder does not exist: {}",
            record.location().display()
        ));
    }

    let tests = test_artifact(record);
    report.checks.tests = storage::exists(&tests).await;
    if !report.checks.tests {
        report
            .errors
            .push(format!("No test file found: {}", tests.display()));
    }

    let contract = config.contract_path(&record.name);
    report.checks.contract = storage::exists(&contract).await;
    if !report.checks.contract {
        report
            .errors
            .push(format!("No contract file found: {}", contract.display()));
    }

    let integration = integration::check(store, record, target).await;
    report.checks.integration = integration.valid();
    if !report.checks.integration {
        report.errors.push(format!(
            "Integration check failed: {}",
            integration.messages().join(", ")
        ));
    }

    tracing::debug!(component = %record.name, checks = ?report.checks, "Preflight finished");
    report
}
