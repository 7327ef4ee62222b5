//! MCP Server
//!
//! Line-delimited JSON-RPC over stdio. One request is read, handled to
//! completion and answered before the next line is read.

pub mod handlers;
pub mod protocol;
pub mod tools;

use anyhow::Result;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::RegistryError;
use crate::registry::Registry;
use protocol::*;

pub const SERVER_NAME: &str = "component-registry";

pub struct McpServer {
    registry: Registry,
}

impl McpServer {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Serve on the process's stdin/stdout until stdin closes
    pub async fn run_stdio(&mut self) -> Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.run(stdin, stdout).await
    }

    /// Serve until `reader` reaches EOF
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(
            components = self.registry.store().len(),
            registry = %self.registry.config().registry_file.display(),
            "Component Registry MCP server started"
        );

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            tracing::trace!("<- {}", preview(line));

            let Some(response) = self.handle(line).await else {
                continue;
            };

            let out = serde_json::to_string(&response)?;
            tracing::trace!("-> {}", preview(&out));
            writer.write_all(out.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        tracing::info!("Component Registry MCP server shutting down");
        Ok(())
    }

    /// Handle a single JSON-RPC message. Notifications get no response.
    pub async fn handle(&mut self, msg: &str) -> Option<JsonRpcResponse> {
        let req: JsonRpcRequest = match serde_json::from_str(msg) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(None, PARSE_ERROR, e.to_string()));
            }
        };

        if req.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                req.id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", req.jsonrpc),
            ));
        }

        if req.is_notification() {
            tracing::debug!(method = %req.method, "Notification");
            return None;
        }

        let id = req.id.clone();
        let response = match req.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),

            "ping" => JsonRpcResponse::success(id, json!({})),

            "tools/list" => to_response(id, json!({ "tools": tools::get_tools() })),

            "tools/call" => {
                let params: ToolCallParams = match serde_json::from_value(req.params) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()))
                    }
                };

                let result =
                    handlers::handle(&mut self.registry, &params.name, params.arguments).await;
                match result {
                    Ok(result) => to_response(id, result),
                    Err(e @ RegistryError::UnknownTool(_)) => {
                        tracing::warn!("{}", e);
                        JsonRpcResponse::error(id, METHOD_NOT_FOUND, e.to_string())
                    }
                    Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
                }
            }

            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {}", req.method),
            ),
        };

        Some(response)
    }
}

fn to_response<T: serde::Serialize>(id: Option<Value>, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcResponse::success(id, v),
        Err(e) => {
            JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {}", e))
        }
    }
}

fn preview(s: &str) -> String {
    if s.chars().count() > 100 {
        format!("{}...", s.chars().take(100).collect::<String>())
    } else {
        s.to_string()
    }
}
