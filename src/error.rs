//! Registry Error Taxonomy
//!
//! Every operation-level failure of the registry is one of these variants.
//! Operations never panic or bubble these out of the protocol layer; they are
//! folded into `{success: false, reason, kind}` payloads instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for registry operations
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Component '{0}' not found")]
    ComponentNotFound(String),

    #[error("CSS namespace '{namespace}' already in use by '{owner}'")]
    NamespaceConflict { namespace: String, owner: String },

    #[error("Component '{0}' is already registered")]
    DuplicateName(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("No injection markers found in {target}")]
    MissingMarkers { target: String },

    #[error("Component '{0}' must pass validation before marking as proven")]
    NotValidated(String),

    #[error("{}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Contract malformed: {0}")]
    ContractMalformed(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Failed to persist registry: {0}")]
    Persistence(String),
}

impl RegistryError {
    pub fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable name, emitted next to `reason`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ComponentNotFound(_) => "ComponentNotFound",
            Self::NamespaceConflict { .. } => "NamespaceConflict",
            Self::DuplicateName(_) => "DuplicateName",
            Self::MissingDependency(_) => "MissingDependency",
            Self::MissingMarkers { .. } => "MissingMarkers",
            Self::NotValidated(_) => "NotValidated",
            Self::FileAccess { .. } => "FileAccessError",
            Self::ContractMalformed(_) => "ContractMalformed",
            Self::InvalidArguments(_) => "InvalidArguments",
            Self::UnknownTool(_) => "UnknownTool",
            Self::Persistence(_) => "PersistenceError",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FileAccess { .. } | Self::Persistence(_) => ErrorCategory::FileSystem,
            Self::MissingDependency(_) => ErrorCategory::Dependency,
            Self::InvalidArguments(_) | Self::UnknownTool(_) => ErrorCategory::Configuration,
            Self::ComponentNotFound(_)
            | Self::NamespaceConflict { .. }
            | Self::DuplicateName(_)
            | Self::MissingMarkers { .. }
            | Self::NotValidated(_)
            | Self::ContractMalformed(_) => ErrorCategory::Validation,
        }
    }
}

/// Categorized error types for better handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// File system errors (may be retryable)
    FileSystem,

    /// Configuration or request errors (not retryable)
    Configuration,

    /// Validation errors (not retryable)
    Validation,

    /// Dependency errors (not retryable)
    Dependency,
}

impl ErrorCategory {
    /// Check if this error category is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::FileSystem)
    }
}

/// Error with context and suggestions, rendered by the CLI
#[derive(Debug)]
pub struct EnhancedError {
    pub reason: String,
    pub category: ErrorCategory,
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
}

impl EnhancedError {
    pub fn new(error: &RegistryError) -> Self {
        let category = error.category();
        let (context, suggestions) = context_and_suggestions(error);

        Self {
            reason: error.to_string(),
            category,
            context,
            suggestions,
        }
    }

    /// Display the error with all context
    pub fn display(&self) -> String {
        let mut output = format!("❌ Error: {}\n", self.reason);

        if !self.context.is_empty() {
            output.push_str("\n📋 Context:\n");
            for ctx in &self.context {
                output.push_str(&format!("   • {}\n", ctx));
            }
        }

        if !self.suggestions.is_empty() {
            output.push_str("\n💡 Suggestions:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("   • {}\n", suggestion));
            }
        }

        output
    }
}

fn context_and_suggestions(error: &RegistryError) -> (Vec<String>, Vec<String>) {
    let mut context = Vec::new();
    let mut suggestions = Vec::new();

    match error {
        RegistryError::ComponentNotFound(name) => {
            context.push(format!("No record named '{}' in the registry", name));
            suggestions.push("Run 'component-registry list' to see registered names".to_string());
            suggestions.push(format!(
                "Register it first: component-registry register {} <namespace>",
                name
            ));
        }
        RegistryError::NamespaceConflict { owner, .. } => {
            context.push(format!("The namespace is claimed by '{}'", owner));
            suggestions.push("Choose a unique CSS class prefix for this component".to_string());
        }
        RegistryError::DuplicateName(_) => {
            context.push("Registration is create-only by default".to_string());
            suggestions.push("Pass --upsert to replace the existing record".to_string());
        }
        RegistryError::NotValidated(name) => {
            context.push("Only validated components can be proven".to_string());
            suggestions.push(format!("Run 'component-registry validate {} <target>' first", name));
        }
        RegistryError::MissingDependency(_) => {
            context.push("Dependency resolution failed".to_string());
            suggestions.push("Register every declared dependency before validating".to_string());
        }
        RegistryError::MissingMarkers { .. } => {
            context.push("Target file has no injection markers for this component".to_string());
            suggestions.push("Add the markers shown by 'component-registry plan'".to_string());
        }
        RegistryError::FileAccess { .. } | RegistryError::Persistence(_) => {
            context.push("File system operation failed".to_string());
            suggestions.push("Check file permissions".to_string());
            suggestions.push("Verify the path exists".to_string());
        }
        RegistryError::ContractMalformed(_) => {
            context.push("Contract document failed validation".to_string());
            suggestions.push(
                "Include Inputs, Outputs, DOM Requirements, CSS Contract and Dependencies sections"
                    .to_string(),
            );
        }
        RegistryError::InvalidArguments(_) | RegistryError::UnknownTool(_) => {
            context.push("Request could not be routed".to_string());
            suggestions.push("Run 'component-registry tools' for the tool list".to_string());
        }
    }

    (context, suggestions)
}
