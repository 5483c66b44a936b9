//! Placement and naming rules tied to a detected project layout.
//!
//! Rules are pure predicates; detecting which convention applies is the
//! caller's job.

use regex::Regex;

use super::path::{file_name, is_ancestor, parent_dir};

/// Which step targets a rule constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Files,
    Directories,
    Any,
}

impl RuleScope {
    fn covers(self, is_dir: bool) -> bool {
        match self {
            Self::Files => !is_dir,
            Self::Directories => is_dir,
            Self::Any => true,
        }
    }
}

/// "Entries under `directory` must have names matching `pattern`."
#[derive(Debug, Clone)]
pub struct ConventionRule {
    pub name: String,
    pub directory: String,
    pub pattern: Regex,
    pub scope: RuleScope,
    /// Also constrain entries in nested subdirectories.
    pub recursive: bool,
}

impl ConventionRule {
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<String>,
        pattern: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            directory: directory.into().trim_matches('/').to_string(),
            pattern: Regex::new(pattern)?,
            scope: RuleScope::Files,
            recursive: false,
        })
    }

    pub fn scope(mut self, scope: RuleScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn applies_to(&self, path: &str, is_dir: bool) -> bool {
        if !self.scope.covers(is_dir) {
            return false;
        }
        let parent = parent_dir(path).unwrap_or("");
        if self.recursive {
            parent == self.directory
                || self.directory.is_empty()
                || is_ancestor(&self.directory, parent)
        } else {
            parent == self.directory
        }
    }

    /// True when the path is outside this rule or satisfies it.
    pub fn permits(&self, path: &str, is_dir: bool) -> bool {
        !self.applies_to(path, is_dir) || self.pattern.is_match(file_name(path))
    }
}

/// The rules belonging to one detected convention.
#[derive(Debug, Clone, Default)]
pub struct ConventionSet {
    pub name: String,
    pub rules: Vec<ConventionRule>,
}

impl ConventionSet {
    pub fn new(name: impl Into<String>, rules: Vec<ConventionRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// First rule the path violates, if any.
    pub fn violation(&self, path: &str, is_dir: bool) -> Option<&ConventionRule> {
        self.rules.iter().find(|rule| !rule.permits(path, is_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components_rule() -> ConventionRule {
        ConventionRule::new(
            "components use PascalCase",
            "src/components",
            r"^[A-Z][A-Za-z0-9]*\.(tsx|jsx)$",
        )
        .unwrap()
    }

    #[test]
    fn rule_only_constrains_direct_children_by_default() {
        let rule = components_rule();
        assert!(rule.permits("src/components/Button.tsx", false));
        assert!(!rule.permits("src/components/button.tsx", false));
        assert!(rule.permits("src/components/forms/input.tsx", false));
        assert!(rule.permits("src/utils/format.ts", false));
        // Directories are out of scope for a files rule.
        assert!(rule.permits("src/components/forms", true));
    }

    #[test]
    fn recursive_rule_reaches_nested_entries() {
        let rule = components_rule().recursive(true);
        assert!(!rule.permits("src/components/forms/input.tsx", false));
        assert!(rule.permits("src/components/forms/Input.tsx", false));
    }

    #[test]
    fn set_reports_first_violated_rule() {
        let dirs = ConventionRule::new("modules are snake_case", "src", r"^[a-z0-9_]+$")
            .unwrap()
            .scope(RuleScope::Directories);
        let set = ConventionSet::new("react", vec![components_rule(), dirs]);

        assert!(set.violation("src/components/Card.tsx", false).is_none());
        assert_eq!(
            set.violation("src/MyModule", true).map(|r| r.name.as_str()),
            Some("modules are snake_case")
        );
    }
}
