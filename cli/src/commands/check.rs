use std::path::Path;

use stepwise_core::api::{
    check_path, is_step_ignored, AppConfig, CliError, ErrorCode, IgnoreFilter, PathViolation,
};
use stepwise_plugins::ignore::load_ignore_rules;

use super::cli::CheckArgs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStatus {
    Allowed(String),
    Ignored(String),
    Unsafe(PathViolation),
}

/// Classify one path. A trailing `/` marks it as a directory for ignore rules.
pub fn classify(path: &str, ignore: &dyn IgnoreFilter) -> PathStatus {
    match check_path(path) {
        Err(violation) => PathStatus::Unsafe(violation),
        Ok(normalized) => {
            if is_step_ignored(ignore, &normalized, path.ends_with('/')) {
                PathStatus::Ignored(normalized)
            } else {
                PathStatus::Allowed(normalized)
            }
        }
    }
}

pub fn handle_check(args: CheckArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let root = args.root.as_deref().unwrap_or(&cfg.normalizer.root);
    let rules = load_ignore_rules(Path::new(root), &cfg.normalizer)
        .map_err(|e| CliError::Config(format!("{e:#}")))?;

    let mut exit = ErrorCode::Success;
    for path in &args.paths {
        match classify(path, &rules) {
            PathStatus::Allowed(p) => println!("ok       {p}"),
            PathStatus::Ignored(p) => println!("ignored  {p}"),
            PathStatus::Unsafe(violation) => {
                println!("unsafe   {path}: {violation}");
                if exit == ErrorCode::Success || violation == PathViolation::Traversal {
                    exit = match violation {
                        PathViolation::Traversal => ErrorCode::PathTraversal,
                        _ => ErrorCode::InvalidPath,
                    };
                }
            }
        }
    }
    Ok(exit.as_u16() as i32)
}
