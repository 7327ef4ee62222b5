//! Registry configuration
//!
//! Layered: built-in defaults, then `<root>/registry.toml`, then environment
//! (a `.env` file is honoured), then whatever the CLI sets explicitly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::storage::RegisterMode;

pub const DEFAULT_ROOT: &str = ".system";
pub const CONFIG_FILE: &str = "registry.toml";
pub const REGISTRY_FILE: &str = "component-registry.json";

pub const ENV_ROOT: &str = "COMPONENT_REGISTRY_ROOT";
pub const ENV_REGISTRY_FILE: &str = "COMPONENT_REGISTRY_FILE";
pub const ENV_DEFAULT_TARGET: &str = "COMPONENT_REGISTRY_TARGET";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Base directory every relative path below resolves against
    pub root: PathBuf,

    /// Persisted registry document
    pub registry_file: PathBuf,

    /// Where component folders live when a registration gives no filepath
    pub components_dir: PathBuf,

    /// `<name>-contract.md` documents
    pub contracts_dir: PathBuf,

    /// `<name>-test.html` sandbox pages
    pub sandbox_dir: PathBuf,

    /// `proven/<name>` folders created on prove
    pub proven_dir: PathBuf,

    /// Target file the preflight integration check runs against
    pub default_target: PathBuf,

    /// Let `register` replace an existing record by default
    pub allow_reregister: bool,
}

/// Shape of `registry.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    registry_file: Option<PathBuf>,
    components_dir: Option<PathBuf>,
    contracts_dir: Option<PathBuf>,
    sandbox_dir: Option<PathBuf>,
    proven_dir: Option<PathBuf>,
    default_target: Option<PathBuf>,
    allow_reregister: Option<bool>,
}

impl RegistryConfig {
    /// Defaults rooted at `root`, without reading any file or variable
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            registry_file: root.join(REGISTRY_FILE),
            components_dir: root.join("components"),
            contracts_dir: root.join("contracts"),
            sandbox_dir: root.join("sandbox"),
            proven_dir: root.join("proven"),
            default_target: root.join("dummy-target.html"),
            allow_reregister: false,
            root,
        }
    }

    /// Resolve the full configuration.
    ///
    /// `root` from the CLI wins over `COMPONENT_REGISTRY_ROOT`, which wins over
    /// the `.system` default.
    pub fn load(root: Option<PathBuf>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let root = root
            .or_else(|| std::env::var_os(ENV_ROOT).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));

        let mut config = Self::with_root(&root);

        let file = root.join(CONFIG_FILE);
        if file.exists() {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let parsed: ConfigFile = toml::from_str(&raw)
                .with_context(|| format!("Invalid config file {}", file.display()))?;
            config.apply_file(parsed);
            tracing::debug!(path = %file.display(), "Applied config file");
        }

        if let Some(path) = std::env::var_os(ENV_REGISTRY_FILE) {
            config.registry_file = PathBuf::from(path);
        }
        if let Some(path) = std::env::var_os(ENV_DEFAULT_TARGET) {
            config.default_target = PathBuf::from(path);
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        let root = self.root.clone();
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { root.join(p) };

        if let Some(p) = file.registry_file {
            self.registry_file = resolve(p);
        }
        if let Some(p) = file.components_dir {
            self.components_dir = resolve(p);
        }
        if let Some(p) = file.contracts_dir {
            self.contracts_dir = resolve(p);
        }
        if let Some(p) = file.sandbox_dir {
            self.sandbox_dir = resolve(p);
        }
        if let Some(p) = file.proven_dir {
            self.proven_dir = resolve(p);
        }
        if let Some(p) = file.default_target {
            self.default_target = resolve(p);
        }
        if let Some(flag) = file.allow_reregister {
            self.allow_reregister = flag;
        }
    }

    pub fn register_mode(&self) -> RegisterMode {
        if self.allow_reregister {
            RegisterMode::Upsert
        } else {
            RegisterMode::CreateOnly
        }
    }

    pub fn component_dir(&self, name: &str) -> PathBuf {
        self.components_dir.join(name)
    }

    pub fn contract_path(&self, name: &str) -> PathBuf {
        self.contracts_dir.join(format!("{}-contract.md", name))
    }

    pub fn sandbox_path(&self, name: &str) -> PathBuf {
        self.sandbox_dir.join(format!("{}-test.html", name))
    }

    pub fn proven_path(&self, name: &str) -> PathBuf {
        self.proven_dir.join(name)
    }

    /// Directories `init` creates
    pub fn directories(&self) -> Vec<&Path> {
        vec![
            self.root.as_path(),
            self.components_dir.as_path(),
            self.contracts_dir.as_path(),
            self.sandbox_dir.as_path(),
            self.proven_dir.as_path(),
        ]
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::with_root(DEFAULT_ROOT)
    }
}
