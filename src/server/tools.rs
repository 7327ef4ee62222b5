//! MCP Tool Definitions

use serde_json::json;

use super::protocol::Tool;

pub const REGISTER_COMPONENT: &str = "register_component";
pub const VALIDATE_INTEGRATION: &str = "validate_integration";
pub const GET_INTEGRATION_PLAN: &str = "get_integration_plan";
pub const LIST_COMPONENTS: &str = "list_components";
pub const GET_COMPONENT_STATUS: &str = "get_component_status";
pub const VALIDATE_CONTRACT: &str = "validate_contract";
pub const RUN_PREFLIGHT_CHECKS: &str = "run_preflight_checks";
pub const TEST_IN_SANDBOX: &str = "test_in_sandbox";
pub const MARK_AS_PROVEN: &str = "mark_as_proven";

fn component_name_only() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "componentName": { "type": "string", "description": "Registered component name" }
        },
        "required": ["componentName"]
    })
}

fn component_and_target() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "componentName": { "type": "string", "description": "Registered component name" },
            "targetFile": {
                "type": "string",
                "description": "File the component will be injected into"
            }
        },
        "required": ["componentName", "targetFile"]
    })
}

/// Get all available MCP tools
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: REGISTER_COMPONENT,
            description:
                "Register a component before integration with persistent storage",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Component name" },
                    "cssNamespace": {
                        "type": "string",
                        "description": "CSS namespace (e.g., .component-header)"
                    },
                    "filepath": { "type": "string", "description": "Path to component files" },
                    "dependencies": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of component dependencies"
                    },
                    "upsert": {
                        "type": "boolean",
                        "default": false,
                        "description": "Replace an existing record with the same name"
                    }
                },
                "required": ["name", "cssNamespace"]
            }),
        },
        Tool {
            name: VALIDATE_INTEGRATION,
            description: "Validate if component can be safely integrated into target file",
            input_schema: component_and_target(),
        },
        Tool {
            name: GET_INTEGRATION_PLAN,
            description: "Get detailed integration strategy for a component",
            input_schema: component_and_target(),
        },
        Tool {
            name: LIST_COMPONENTS,
            description: "List all registered components with their status",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        Tool {
            name: GET_COMPONENT_STATUS,
            description: "Get detailed status of a specific component",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Component name" }
                },
                "required": ["name"]
            }),
        },
        Tool {
            name: VALIDATE_CONTRACT,
            description: "Validate component implementation matches its contract",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "componentName": { "type": "string" },
                    "contractPath": {
                        "type": "string",
                        "description": "Path to the contract document"
                    }
                },
                "required": ["componentName", "contractPath"]
            }),
        },
        Tool {
            name: RUN_PREFLIGHT_CHECKS,
            description: "Run all pre-flight validation checks on component",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "componentName": { "type": "string" },
                    "targetFile": {
                        "type": "string",
                        "description": "Integration target; defaults to the configured target"
                    }
                },
                "required": ["componentName"]
            }),
        },
        Tool {
            name: TEST_IN_SANDBOX,
            description: "Check if component has sandbox test and provide instructions",
            input_schema: component_name_only(),
        },
        Tool {
            name: MARK_AS_PROVEN,
            description: "Mark component as proven after passing all validation",
            input_schema: component_name_only(),
        },
    ]
}
