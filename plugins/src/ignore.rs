//! Ignore-rule sources: built-in defaults, `.gitignore`, the project ignore
//! file and configured extra patterns, in increasing precedence.

use std::path::Path;

use anyhow::Context;
use lazy_static::lazy_static;
use stepwise_core::api::{IgnoreRules, NormalizerConfig};

lazy_static! {
    /// Patterns every project is assumed to ignore.
    pub static ref DEFAULT_IGNORES: Vec<&'static str> = vec![
        ".git/",
        ".svn/",
        ".hg/",
        "node_modules/",
        "bower_components/",
        "dist/",
        "build/",
        "out/",
        "target/",
        "coverage/",
        ".next/",
        ".nuxt/",
        ".cache/",
        ".venv/",
        "venv/",
        "__pycache__/",
        "*.pyc",
        ".idea/",
        ".vscode/",
        "*.log",
        ".DS_Store",
        "Thumbs.db",
        ".env",
        ".env.*",
        "!.env.example",
    ];
}

pub fn default_rules() -> IgnoreRules {
    IgnoreRules::from_lines(DEFAULT_IGNORES.iter())
}

/// Build the rule set for `root` as configured.
///
/// Missing ignore files are skipped; unreadable ones are errors.
pub fn load_ignore_rules(root: &Path, config: &NormalizerConfig) -> anyhow::Result<IgnoreRules> {
    let mut rules = if config.use_default_ignores {
        default_rules()
    } else {
        IgnoreRules::new()
    };

    if config.use_gitignore {
        add_file(&mut rules, &root.join(".gitignore"))?;
    }
    if !config.ignore_file.trim().is_empty() {
        add_file(&mut rules, &root.join(&config.ignore_file))?;
    }
    for pattern in &config.extra_ignores {
        rules.add_line(pattern);
    }

    tracing::debug!("Ignore rules for {}: {} patterns", root.display(), rules.len());
    Ok(rules)
}

fn add_file(rules: &mut IgnoreRules, path: &Path) -> anyhow::Result<()> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).with_context(|| format!("read {} failed", path.display())),
    };
    rules.add_source(&path.display().to_string(), &contents);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_common_build_output() {
        let rules = default_rules();
        assert!(rules.is_ignored("node_modules/react/index.js"));
        assert!(rules.is_ignored("target/"));
        assert!(rules.is_ignored("logs/server.log"));
        assert!(rules.is_ignored(".env.local"));
        assert!(!rules.is_ignored(".env.example"));
        assert!(!rules.is_ignored("src/main.rs"));
    }

    #[test]
    fn project_files_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "# generated\n/generated/\n").unwrap();
        std::fs::write(dir.path().join(".stepwiseignore"), "!build/\n").unwrap();

        let config = NormalizerConfig {
            extra_ignores: vec!["*.tmp".to_string()],
            ..NormalizerConfig::default()
        };
        let rules = load_ignore_rules(dir.path(), &config).unwrap();

        assert!(rules.is_ignored("generated/api.ts"));
        assert!(!rules.is_ignored("src/generated/api.ts"));
        assert!(!rules.is_ignored("build/"));
        assert!(rules.is_ignored("notes.tmp"));
    }

    #[test]
    fn missing_files_and_disabled_defaults_yield_empty_rules() {
        let dir = tempfile::tempdir().unwrap();
        let config = NormalizerConfig {
            use_default_ignores: false,
            ..NormalizerConfig::default()
        };

        let rules = load_ignore_rules(dir.path(), &config).unwrap();
        assert!(rules.is_empty());
    }
}
