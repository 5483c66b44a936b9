use thiserror::Error;

use super::code::ErrorCode;
use super::plan::PlanError;
use super::scheduler::SchedulerError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Plan(#[from] PlanError),
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Plan(e) => e.error_code(),
            Self::Scheduler(e) => e.error_code(),
            Self::Command(_) | Self::Io(_) | Self::Anyhow(_) => ErrorCode::GeneralError,
        }
    }
}
