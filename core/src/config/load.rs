use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default stepwise data directory: ~/.stepwise
pub fn get_stepwise_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".stepwise"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.stepwise/config.toml (highest)
    let user_config = get_stepwise_data_dir()?.join("config.toml");

    // Priority 2: ./stepwise.toml (current directory)
    let local_config = Path::new("stepwise.toml");

    let mut cfg = if user_config.exists() {
        read_config(&user_config)?
    } else if local_config.exists() {
        read_config(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let mut cfg = read_config(path)?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn read_config(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read {} failed: {e}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("parse {} failed: {e}", path.display()))?;
    Ok(cfg)
}

// Environment variable overrides (Priority 0: highest)
fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Ok(v) = std::env::var("STEPWISE_MAX_CONCURRENCY") {
        match v.trim().parse::<usize>() {
            Ok(n) if n > 0 => cfg.scheduler.max_concurrency = n,
            _ => tracing::warn!("ignoring invalid STEPWISE_MAX_CONCURRENCY={}", v),
        }
    }
    if let Ok(v) = std::env::var("STEPWISE_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.logging.level = v;
        }
    }
}
