//! Convention presets and project-convention detection.

use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;
use stepwise_core::api::{ConventionRule, ConventionSet, NormalizerConfig, RuleScope};

struct RuleSpec {
    name: &'static str,
    directory: &'static str,
    pattern: &'static str,
    scope: RuleScope,
    recursive: bool,
}

const fn rule(
    name: &'static str,
    directory: &'static str,
    pattern: &'static str,
    scope: RuleScope,
    recursive: bool,
) -> RuleSpec {
    RuleSpec {
        name,
        directory,
        pattern,
        scope,
        recursive,
    }
}

const REACT: &[RuleSpec] = &[
    rule(
        "components-pascal-case",
        "src/components",
        r"^[A-Z][A-Za-z0-9]*(\.(test|spec|stories|module))?\.(tsx|jsx|ts|js|css|scss)$",
        RuleScope::Files,
        true,
    ),
    rule(
        "hooks-use-prefix",
        "src/hooks",
        r"^use[A-Z][A-Za-z0-9]*(\.(test|spec))?\.(ts|tsx|js|jsx)$",
        RuleScope::Files,
        false,
    ),
];

const NEXTJS_APP: &[RuleSpec] = &[
    rule(
        "app-route-segments",
        "app",
        r"^(\([a-z0-9-]+\)|\[\[?(\.\.\.)?[A-Za-z0-9_]+\]\]?|@[a-z0-9-]+|_?[a-z0-9][a-z0-9-]*)$",
        RuleScope::Directories,
        true,
    ),
    rule(
        "components-pascal-case",
        "components",
        r"^[A-Z][A-Za-z0-9]*(\.(test|spec|module))?\.(tsx|jsx|ts|js|css)$",
        RuleScope::Files,
        true,
    ),
];

const RUST: &[RuleSpec] = &[
    rule(
        "modules-snake-case",
        "src",
        r"^[a-z0-9_]+(\.[a-z0-9_]+)*$",
        RuleScope::Any,
        true,
    ),
    rule(
        "integration-tests-snake-case",
        "tests",
        r"^[a-z0-9_]+(\.rs)?$",
        RuleScope::Any,
        false,
    ),
];

const PYTHON: &[RuleSpec] = &[
    rule(
        "tests-prefixed",
        "tests",
        r"^(test_[a-z0-9_]+\.py|conftest\.py|__init__\.py|[^.]+\.(json|ya?ml|txt|toml|cfg|ini))$",
        RuleScope::Files,
        false,
    ),
    rule(
        "packages-snake-case",
        "src",
        r"^[a-z_][a-z0-9_]*(\.[a-z0-9]+)?$",
        RuleScope::Any,
        true,
    ),
];

const PRESET_SPECS: &[(&str, &[RuleSpec])] = &[
    ("react", REACT),
    ("nextjs-app", NEXTJS_APP),
    ("rust", RUST),
    ("python", PYTHON),
];

lazy_static! {
    static ref PRESETS: HashMap<&'static str, ConventionSet> = PRESET_SPECS
        .iter()
        .map(|(name, specs)| (*name, build_set(name, specs)))
        .collect();
}

fn build_set(name: &str, specs: &[RuleSpec]) -> ConventionSet {
    let rules = specs
        .iter()
        .filter_map(|spec| {
            match ConventionRule::new(spec.name, spec.directory, spec.pattern) {
                Ok(rule) => Some(rule.scope(spec.scope).recursive(spec.recursive)),
                Err(e) => {
                    tracing::error!("Invalid pattern in convention rule {}: {}", spec.name, e);
                    None
                }
            }
        })
        .collect();
    ConventionSet::new(name, rules)
}

/// Names of all built-in convention presets.
pub fn preset_names() -> Vec<&'static str> {
    PRESET_SPECS.iter().map(|(name, _)| *name).collect()
}

pub fn preset(name: &str) -> Option<ConventionSet> {
    PRESETS.get(name).cloned()
}

/// Guess the project convention from marker files under `root`.
pub fn detect_convention(root: &Path) -> Option<&'static str> {
    let has = |name: &str| root.join(name).exists();

    if ["next.config.js", "next.config.mjs", "next.config.ts"]
        .iter()
        .any(|f| has(f))
        && (has("app") || has("src/app"))
    {
        return Some("nextjs-app");
    }
    if has("Cargo.toml") {
        return Some("rust");
    }
    if has("package.json") && package_uses_react(&root.join("package.json")) {
        return Some("react");
    }
    if has("pyproject.toml") || has("setup.py") {
        return Some("python");
    }
    None
}

fn package_uses_react(manifest: &Path) -> bool {
    let Ok(raw) = std::fs::read_to_string(manifest) else {
        return false;
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
        tracing::debug!("Unparseable {}", manifest.display());
        return false;
    };
    ["dependencies", "devDependencies", "peerDependencies"]
        .iter()
        .any(|section| value[*section].get("react").is_some())
}

/// Resolve the convention set for a normalizer run.
///
/// An explicit preset name wins; otherwise detection runs when enabled.
pub fn load_conventions(
    root: &Path,
    config: &NormalizerConfig,
) -> anyhow::Result<Option<ConventionSet>> {
    if let Some(name) = config.convention.as_deref().filter(|n| !n.trim().is_empty()) {
        return preset(name).map(Some).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown convention '{}' (expected one of: {})",
                name,
                preset_names().join(", ")
            )
        });
    }

    if config.detect_convention {
        if let Some(name) = detect_convention(root) {
            tracing::info!("Detected {} project convention in {}", name, root.display());
            return Ok(preset(name));
        }
    }

    Ok(None)
}
