//! Component records and registration input

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{RegistryError, Result};

/// Lifecycle status. Ordered: a record only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Registered,
    Validated,
    Proven,
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentStatus::Registered => "registered",
            ComponentStatus::Validated => "validated",
            ComponentStatus::Proven => "proven",
        };
        f.write_str(s)
    }
}

/// One registered component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub name: String,
    pub css_namespace: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub filepath: PathBuf,
    pub status: ComponentStatus,
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub integrated: bool,
    pub registered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrated_at: Option<DateTime<Utc>>,
}

impl ComponentRecord {
    /// Fresh record in the initial `registered` state
    pub fn new(spec: ComponentSpec, filepath: PathBuf, now: DateTime<Utc>) -> Self {
        Self {
            name: spec.name,
            css_namespace: spec.css_namespace,
            dependencies: spec.dependencies,
            filepath,
            status: ComponentStatus::Registered,
            validated: false,
            integrated: false,
            registered_at: now,
            validated_at: None,
            integrated_at: None,
        }
    }

    /// Directory holding the component's files.
    ///
    /// `filepath` may name either the component folder or a file inside it.
    pub fn location(&self) -> &Path {
        if self.filepath.extension().is_some() {
            self.filepath.parent().unwrap_or(&self.filepath)
        } else {
            &self.filepath
        }
    }
}

/// What a caller supplies to register a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    pub name: String,
    pub css_namespace: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub filepath: Option<PathBuf>,
}

impl ComponentSpec {
    pub fn new(name: impl Into<String>, css_namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            css_namespace: css_namespace.into(),
            dependencies: Vec::new(),
            filepath: None,
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.filepath = Some(path.into());
        self
    }

    /// Names become single path segments under the registry directories,
    /// so separators and `..` are refused.
    pub fn check_name(&self) -> Result<()> {
        let name = self.name.as_str();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidArguments(
                "component name must not be empty".to_string(),
            ));
        }
        if name.contains(['/', '\\']) || name.contains("..") {
            return Err(RegistryError::InvalidArguments(format!(
                "component name '{}' must not contain path separators or '..'",
                name
            )));
        }
        Ok(())
    }
}
