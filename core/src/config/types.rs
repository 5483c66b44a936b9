use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub scheduler: SchedulerSection,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "stepwise_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// `[scheduler]` table. Converted into a `SchedulerConfig` before a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub default_max_retries: u32,

    #[serde(default = "default_true")]
    pub enable_retries: bool,

    #[serde(default = "default_true")]
    pub enable_timeout: bool,

    /// Fail dependents of a failed, unknown or cyclic dependency instead of
    /// leaving them unscheduled.
    #[serde(default = "default_true")]
    pub propagate_dependency_failure: bool,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            default_timeout_ms: default_timeout_ms(),
            default_max_retries: default_max_retries(),
            enable_retries: true,
            enable_timeout: true,
            propagate_dependency_failure: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_strategy")]
    pub strategy: String,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            strategy: default_retry_strategy(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_retry_strategy() -> String {
    "exponential-backoff".to_string()
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_batch_size")]
    pub size: usize,
    #[serde(default)]
    pub pause_ms: u64,
}

fn default_batch_size() -> usize {
    50
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: default_batch_size(),
            pause_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Directory plan paths are relative to. Ignore files are read from here.
    #[serde(default = "default_root")]
    pub root: String,

    /// Project-local ignore file, relative to `root`.
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,

    #[serde(default = "default_true")]
    pub use_gitignore: bool,

    #[serde(default = "default_true")]
    pub use_default_ignores: bool,

    #[serde(default)]
    pub extra_ignores: Vec<String>,

    /// Convention preset name; overrides detection when set.
    #[serde(default)]
    pub convention: Option<String>,

    #[serde(default)]
    pub detect_convention: bool,
}

fn default_root() -> String {
    ".".to_string()
}

fn default_ignore_file() -> String {
    ".stepwiseignore".to_string()
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            ignore_file: default_ignore_file(),
            use_gitignore: true,
            use_default_ignores: true,
            extra_ignores: Vec::new(),
            convention: None,
            detect_convention: false,
        }
    }
}
