mod code;
#[allow(clippy::module_inception)]
pub mod error;
pub mod plan;
pub mod scheduler;

pub use code::ErrorCode;
pub use error::CliError;
pub use plan::{PathViolation, PlanError};
pub use scheduler::{SchedulerError, TaskFailure};
