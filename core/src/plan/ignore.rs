//! Ignore rules with gitignore semantics.
//!
//! The normalizer only sees the [`IgnoreFilter`] seam; where the rules come
//! from (built-in defaults, `.gitignore`, a project ignore file) is decided by
//! the caller.

use glob::{MatchOptions, Pattern};

/// Predicate deciding whether a root-relative path is excluded from a plan.
///
/// Directory paths are passed with a trailing `/`.
pub trait IgnoreFilter: Send + Sync {
    fn ignores(&self, relative_path: &str) -> bool;
}

impl<F> IgnoreFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn ignores(&self, relative_path: &str) -> bool {
        self(relative_path)
    }
}

/// Filter that ignores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIgnore;

impl IgnoreFilter for NoIgnore {
    fn ignores(&self, _relative_path: &str) -> bool {
        false
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct IgnoreRule {
    raw: String,
    pattern: Pattern,
    negated: bool,
    dir_only: bool,
    anchored: bool,
}

impl IgnoreRule {
    fn parse(line: &str) -> Option<Result<Self, glob::PatternError>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (negated, body) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line.strip_prefix('\\').unwrap_or(line)),
        };
        let (dir_only, body) = match body.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let (anchored, body) = match body.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (body.contains('/'), body),
        };
        if body.is_empty() {
            return None;
        }

        Some(Pattern::new(body).map(|pattern| Self {
            raw: line.to_string(),
            pattern,
            negated,
            dir_only,
            anchored,
        }))
    }

    fn matches(&self, candidate: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        if self.anchored {
            self.pattern.matches_with(candidate, MATCH_OPTIONS)
        } else {
            let name = candidate.rsplit('/').next().unwrap_or(candidate);
            self.pattern.matches_with(name, MATCH_OPTIONS)
        }
    }
}

/// Ordered rule set; later rules override earlier ones, as in `.gitignore`.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Self::new();
        for line in lines {
            rules.add_line(line.as_ref());
        }
        rules
    }

    /// Add one rule line. Comments, blank lines and invalid globs add nothing.
    pub fn add_line(&mut self, line: &str) -> bool {
        match IgnoreRule::parse(line) {
            Some(Ok(rule)) => {
                self.rules.push(rule);
                true
            }
            Some(Err(e)) => {
                tracing::warn!("Invalid ignore pattern '{}': {}", line.trim(), e);
                false
            }
            None => false,
        }
    }

    /// Add every rule of an ignore file's contents; returns how many were added.
    pub fn add_source(&mut self, source: &str, contents: &str) -> usize {
        let added = contents.lines().filter(|line| self.add_line(line)).count();
        tracing::debug!("Loaded {} ignore rules from {}", added, source);
        added
    }

    pub fn extend(&mut self, other: IgnoreRules) {
        self.rules.extend(other.rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.raw.as_str())
    }

    fn verdict(&self, candidate: &str, is_dir: bool) -> Option<bool> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(candidate, is_dir))
            .map(|rule| !rule.negated)
    }

    /// Whether `path` (root-relative, `/`-separated) is ignored.
    ///
    /// A path inside an ignored directory is ignored regardless of later
    /// negations, matching git's behaviour.
    pub fn is_ignored(&self, path: &str) -> bool {
        let is_dir = path.ends_with('/');
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() || self.rules.is_empty() {
            return false;
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        for depth in 1..segments.len() {
            let ancestor = segments[..depth].join("/");
            if self.verdict(&ancestor, true) == Some(true) {
                return true;
            }
        }
        self.verdict(trimmed, is_dir).unwrap_or(false)
    }
}

impl IgnoreFilter for IgnoreRules {
    fn ignores(&self, relative_path: &str) -> bool {
        self.is_ignored(relative_path)
    }
}

/// Test a normalized step path, adding the trailing separator for directories.
pub fn is_step_ignored(filter: &dyn IgnoreFilter, path: &str, is_dir: bool) -> bool {
    if is_dir {
        filter.ignores(&format!("{path}/"))
    } else {
        filter.ignores(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(lines: &[&str]) -> IgnoreRules {
        IgnoreRules::from_lines(lines.iter().copied())
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let r = rules(&["# comment", "", "   ", "*.log"]);
        assert_eq!(r.len(), 1);
        assert!(r.is_ignored("debug.log"));
        assert!(r.is_ignored("logs/app/debug.log"));
        assert!(!r.is_ignored("debug.txt"));
    }

    #[test]
    fn directory_patterns_cover_contents() {
        let r = rules(&["node_modules/"]);
        assert!(r.is_ignored("node_modules/"));
        assert!(r.is_ignored("node_modules/react/index.js"));
        assert!(r.is_ignored("packages/app/node_modules/x.js"));
        // A file with the same name is not a directory.
        assert!(!r.is_ignored("node_modules"));
    }

    #[test]
    fn anchored_patterns_match_from_root() {
        let r = rules(&["/build", "docs/*.tmp"]);
        assert!(r.is_ignored("build"));
        assert!(r.is_ignored("build/out.js"));
        assert!(!r.is_ignored("src/build"));
        assert!(r.is_ignored("docs/a.tmp"));
        assert!(!r.is_ignored("docs/nested/a.tmp"));
    }

    #[test]
    fn negation_reincludes_files_but_not_ignored_dirs() {
        let r = rules(&["*.env", "!example.env"]);
        assert!(r.is_ignored("prod.env"));
        assert!(!r.is_ignored("example.env"));

        let r = rules(&["secrets/", "!secrets/readme.md"]);
        assert!(r.is_ignored("secrets/readme.md"));
    }

    #[test]
    fn step_paths_get_directory_suffix() {
        let r = rules(&["dist/"]);
        assert!(is_step_ignored(&r, "dist", true));
        assert!(!is_step_ignored(&r, "dist", false));
        assert!(!is_step_ignored(&NoIgnore, "dist", true));

        let only_tmp = |p: &str| p.starts_with("tmp");
        assert!(is_step_ignored(&only_tmp, "tmp", false));
    }
}
