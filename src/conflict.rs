//! Conflict detection
//!
//! Two kinds of conflict: a namespace already claimed inside the registry,
//! and a namespace already present in the text of a target file.

use std::fmt;
use std::path::Path;

use crate::error::{RegistryError, Result};
use crate::storage::RegistryStore;

/// Owner of `candidate` if a record other than `claimant` already declares it
pub fn namespace_conflict<'a>(
    store: &'a RegistryStore,
    candidate: &str,
    claimant: &str,
) -> Option<&'a str> {
    store
        .namespace_owner(candidate)
        .filter(|owner| *owner != claimant)
}

/// Coarse target-file conflict heuristic: plain substring containment.
///
/// This is deliberately literal. `.c-btn` is reported as present in a file
/// that only contains `.c-btn-group`, and `btn` matches inside `submit-btn`.
pub fn substring_conflict(namespace: &str, contents: &str) -> bool {
    !namespace.is_empty() && contents.contains(namespace)
}

/// Read a target file as text
pub async fn read_target(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RegistryError::file_access(path, e))
}

/// Text tokens marking where a component's code is injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionMarker {
    /// `<!-- INJECT:name -->`, a bare anchor some targets use instead of the three below
    Anchor,
    Html,
    Css,
    Js,
}

impl InjectionMarker {
    pub const STANDARD: [InjectionMarker; 3] =
        [InjectionMarker::Html, InjectionMarker::Css, InjectionMarker::Js];

    pub const ALL: [InjectionMarker; 4] = [
        InjectionMarker::Anchor,
        InjectionMarker::Html,
        InjectionMarker::Css,
        InjectionMarker::Js,
    ];

    pub fn text(&self, component: &str) -> String {
        match self {
            InjectionMarker::Anchor => format!("<!-- INJECT:{} -->", component),
            InjectionMarker::Html => format!("<!-- INJECT:{}:HTML -->", component),
            InjectionMarker::Css => format!("/* INJECT:{}:CSS */", component),
            InjectionMarker::Js => format!("// INJECT:{}:JS", component),
        }
    }
}

impl fmt::Display for InjectionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InjectionMarker::Anchor => "anchor",
            InjectionMarker::Html => "HTML",
            InjectionMarker::Css => "CSS",
            InjectionMarker::Js => "JS",
        };
        f.write_str(s)
    }
}

/// The three standard markers a target is expected to carry
pub fn expected_markers(component: &str) -> Vec<String> {
    InjectionMarker::STANDARD
        .iter()
        .map(|m| m.text(component))
        .collect()
}

/// Every recognised marker for `component` that appears in `contents`
pub fn find_markers(component: &str, contents: &str) -> Vec<String> {
    InjectionMarker::ALL
        .iter()
        .map(|m| m.text(component))
        .filter(|marker| contents.contains(marker.as_str()))
        .collect()
}
