use thiserror::Error;

use super::code::ErrorCode;

/// Submission-time scheduler errors. Failures of individual tasks never
/// surface here; they are recorded in the task's result instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Duplicate task ID: {0}")]
    DuplicateTaskId(String),

    #[error("Dependency not found: task '{task_id}' depends on '{missing_dep}'")]
    DependencyNotFound {
        task_id: String,
        missing_dep: String,
    },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("invalid scheduler config: {0}")]
    InvalidConfig(String),
}

impl SchedulerError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::DuplicateTaskId(_) => ErrorCode::ValidationError,
            Self::DependencyNotFound { .. } => ErrorCode::DependencyError,
            Self::CircularDependency(_) => ErrorCode::CircularDependency,
            Self::InvalidConfig(_) => ErrorCode::ConfigError,
        }
    }
}

/// Why a single execution attempt (or the task as a whole) did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },

    #[error("cancelled")]
    Cancelled,

    #[error("dependency '{dependency}' did not complete")]
    DependencyFailed { dependency: String },

    #[error("unknown dependency '{dependency}'")]
    UnknownDependency { dependency: String },

    #[error("circular dependency: {0}")]
    CircularDependency(String),
}

impl TaskFailure {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Failed(_) => ErrorCode::GeneralError,
            Self::TimedOut { .. } => ErrorCode::Timeout,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::DependencyFailed { .. } | Self::UnknownDependency { .. } => {
                ErrorCode::DependencyError
            }
            Self::CircularDependency(_) => ErrorCode::CircularDependency,
        }
    }

    /// Whether another attempt could change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::TimedOut { .. })
    }
}
