//! # Component Registry
//!
//! Tracks UI components before they are injected into a shared target file,
//! and refuses integrations that would collide.
//!
//! ## Features
//!
//! - **Namespace ownership**: every CSS namespace belongs to exactly one component
//! - **Integration checks**: marker discovery, namespace collision and dependency resolution
//! - **Lifecycle**: `registered → validated → proven`, proven only after validation
//! - **Preflight**: four independent checks reported together
//! - **MCP server**: nine tools over line-delimited JSON-RPC on stdio
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use component_registry::{ComponentSpec, Registry, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut registry = Registry::open(RegistryConfig::load(None)?).await?;
//!
//!     registry
//!         .register_component(ComponentSpec::new("header", ".c-header"), None)
//!         .await?;
//!     let outcome = registry
//!         .validate_integration("header", "index.html".as_ref())
//!         .await?;
//!     println!("safe to integrate: {}", outcome.safe_to_integrate);
//!     Ok(())
//! }
//! ```

pub mod component;
pub mod config;
pub mod conflict;
pub mod error;
pub mod lifecycle;
pub mod planner;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod storage;
pub mod validation;

// Re-export main types for library consumers
pub use component::{ComponentRecord, ComponentSpec, ComponentStatus};
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use planner::IntegrationPlan;
pub use registry::Registry;
pub use server::McpServer;
pub use storage::{RegisterMode, RegistryStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
