//! MCP Tool Handlers
//!
//! Decode tool arguments, call the registry, and fold the outcome into a
//! tool result. Operation failures become `{success: false, reason, kind}`
//! payloads; only an unknown tool name is returned as `Err`.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::protocol::ToolCallResult;
use super::tools;
use crate::component::ComponentSpec;
use crate::error::{RegistryError, Result};
use crate::planner::IntegrationPlan;
use crate::registry::Registry;
use crate::storage::RegisterMode;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterArgs {
    name: String,
    css_namespace: String,
    #[serde(default)]
    filepath: Option<PathBuf>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    upsert: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentArgs {
    component_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetArgs {
    component_name: String,
    target_file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct StatusArgs {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractArgs {
    component_name: String,
    #[serde(default)]
    contract_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreflightArgs {
    component_name: String,
    #[serde(default)]
    target_file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PlanPayload {
    success: bool,
    #[serde(flatten)]
    plan: IntegrationPlan,
}

/// `{success: false, reason, kind}` for a registry error
pub fn failure(err: &RegistryError) -> Value {
    json!({
        "success": false,
        "reason": err.to_string(),
        "kind": err.kind(),
    })
}

fn args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    // A missing `arguments` member decodes like an empty object
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|e| RegistryError::InvalidArguments(e.to_string()))
}

fn outcome<T: Serialize>(result: Result<T>) -> ToolCallResult {
    match result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(v) => ToolCallResult::json(&v),
            Err(e) => ToolCallResult::error(&json!({
                "success": false,
                "reason": format!("Serialization error: {}", e),
            })),
        },
        Err(e) => {
            tracing::debug!(kind = e.kind(), "Operation failed: {}", e);
            ToolCallResult::json(&failure(&e))
        }
    }
}

/// Dispatch one tool call.
pub async fn handle(
    registry: &mut Registry,
    tool: &str,
    arguments: Value,
) -> Result<ToolCallResult> {
    tracing::debug!(tool, "Calling tool");

    let result = match tool {
        tools::REGISTER_COMPONENT => match args::<RegisterArgs>(arguments) {
            Ok(a) => {
                let spec = ComponentSpec {
                    name: a.name,
                    css_namespace: a.css_namespace,
                    dependencies: a.dependencies,
                    filepath: a.filepath,
                };
                let mode = a.upsert.map(|upsert| {
                    if upsert {
                        RegisterMode::Upsert
                    } else {
                        RegisterMode::CreateOnly
                    }
                });
                outcome(registry.register_component(spec, mode).await)
            }
            Err(e) => invalid(e),
        },

        tools::VALIDATE_INTEGRATION => match args::<TargetArgs>(arguments) {
            Ok(a) => outcome(
                registry
                    .validate_integration(&a.component_name, &a.target_file)
                    .await,
            ),
            Err(e) => invalid(e),
        },

        tools::GET_INTEGRATION_PLAN => match args::<TargetArgs>(arguments) {
            Ok(a) => outcome(
                registry
                    .integration_plan(&a.component_name, &a.target_file)
                    .await
                    .map(|plan| PlanPayload {
                        success: true,
                        plan,
                    }),
            ),
            Err(e) => invalid(e),
        },

        tools::LIST_COMPONENTS => outcome(Ok(registry.list_components())),

        tools::GET_COMPONENT_STATUS => match args::<StatusArgs>(arguments) {
            Ok(a) => outcome(registry.component_status(&a.name).await),
            Err(e) => invalid(e),
        },

        tools::VALIDATE_CONTRACT => match args::<ContractArgs>(arguments) {
            Ok(a) => outcome(
                registry
                    .validate_contract(&a.component_name, a.contract_path.as_deref())
                    .await,
            ),
            Err(e) => invalid(e),
        },

        tools::RUN_PREFLIGHT_CHECKS => match args::<PreflightArgs>(arguments) {
            Ok(a) => outcome(
                registry
                    .run_preflight_checks(&a.component_name, a.target_file.as_deref())
                    .await,
            ),
            Err(e) => invalid(e),
        },

        tools::TEST_IN_SANDBOX => match args::<ComponentArgs>(arguments) {
            Ok(a) => outcome(registry.test_in_sandbox(&a.component_name).await),
            Err(e) => invalid(e),
        },

        tools::MARK_AS_PROVEN => match args::<ComponentArgs>(arguments) {
            Ok(a) => outcome(registry.mark_as_proven(&a.component_name).await),
            Err(e) => invalid(e),
        },

        other => return Err(RegistryError::UnknownTool(other.to_string())),
    };

    Ok(result)
}

fn invalid(err: RegistryError) -> ToolCallResult {
    tracing::warn!("Rejected tool arguments: {}", err);
    ToolCallResult::error(&failure(&err))
}
