//! Contract documents
//!
//! A contract is Markdown with five required `##` sections and an optional
//! namespace line such as ``**CSS Namespace:** `.c-btn` ``.

use once_cell::sync::Lazy;
use regex::Regex;

pub const REQUIRED_SECTIONS: [&str; 5] = [
    "## Inputs",
    "## Outputs",
    "## DOM Requirements",
    "## CSS Contract",
    "## Dependencies",
];

static NAMESPACE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Namespace.*`([^`]+)`").expect("namespace pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractReport {
    pub missing_sections: Vec<String>,
    pub declared_namespace: Option<String>,
    pub expected_namespace: String,
}

impl ContractReport {
    /// A declared namespace must equal the registered one; no declaration is fine.
    pub fn namespace_matches(&self) -> bool {
        self.declared_namespace
            .as_deref()
            .map_or(true, |ns| ns == self.expected_namespace)
    }

    pub fn valid(&self) -> bool {
        self.missing_sections.is_empty() && self.namespace_matches()
    }

    /// Why the contract failed, or `None` if it is valid
    pub fn failure(&self) -> Option<String> {
        if !self.missing_sections.is_empty() {
            return Some(format!(
                "Contract missing required sections: {}",
                self.missing_sections.join(", ")
            ));
        }
        match &self.declared_namespace {
            Some(declared) if !self.namespace_matches() => Some(format!(
                "Contract CSS namespace '{}' doesn't match component '{}'",
                declared, self.expected_namespace
            )),
            _ => None,
        }
    }
}

/// Check a contract's text against the namespace the component registered
pub fn inspect(contents: &str, expected_namespace: &str) -> ContractReport {
    let missing_sections = REQUIRED_SECTIONS
        .iter()
        .filter(|section| !contents.contains(*section))
        .map(|s| s.to_string())
        .collect();

    let declared_namespace = NAMESPACE_LINE
        .captures(contents)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    ContractReport {
        missing_sections,
        declared_namespace,
        expected_namespace: expected_namespace.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUTTON_CONTRACT: &str = r#"# Button Contract

**CSS Namespace:** `.c-btn`

## Inputs
- label: string

## Outputs
- click event

## DOM Requirements
- `<button>` element

## CSS Contract
All classes prefixed with `.c-btn`.

## Dependencies
None
"#;

    #[test]
    fn test_complete_contract() {
        let report = inspect(BUTTON_CONTRACT, ".c-btn");
        assert!(report.valid());
        assert_eq!(report.declared_namespace.as_deref(), Some(".c-btn"));
        assert_eq!(report.failure(), None);
    }

    #[test]
    fn test_missing_sections_listed_in_order() {
        let text = "## Inputs\n## CSS Contract\n";
        let report = inspect(text, ".c-btn");
        assert_eq!(
            report.missing_sections,
            vec!["## Outputs", "## DOM Requirements", "## Dependencies"]
        );
        assert!(report
            .failure()
            .unwrap()
            .starts_with("Contract missing required sections: ## Outputs"));
    }

    #[test]
    fn test_namespace_mismatch() {
        let report = inspect(BUTTON_CONTRACT, ".c-button");
        assert!(!report.valid());
        assert!(report.failure().unwrap().contains("doesn't match"));
    }

    #[test]
    fn test_no_namespace_declaration_is_accepted() {
        let text = REQUIRED_SECTIONS.join("\n");
        let report = inspect(&text, ".c-anything");
        assert!(report.valid());
        assert_eq!(report.declared_namespace, None);
    }
}
