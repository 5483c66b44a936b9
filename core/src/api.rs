//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `stepwise_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from_path, AppConfig, BatchConfig, LoggingConfig, NormalizerConfig,
    RetryConfig, SchedulerSection,
};
pub use crate::error::{
    CliError, ErrorCode, PathViolation, PlanError, SchedulerError, TaskFailure,
};
pub use crate::plan::{
    check_path, consolidate, extract_plan_json, is_step_ignored, normalize, plan_to_tasks,
    renumber, step_dependencies, step_task_id, ActionKind,
    ConventionRule, ConventionSet, ExecutionPlan, FileSource, IgnoreFilter, IgnoreRules,
    NoIgnore, PlanNormalizer, PlanStep, RuleScope, StepExecutor, StepKind, StepOutput,
    MODIFICATION_DELIMITER,
};
pub use crate::scheduler::{
    run_tasks, BatchRunner, ExponentialBackoff, ObserverChain, ProgressMonitor, RetryStrategy,
    RunOutcome, RunSummary, Scheduler, SchedulerBuilder, SchedulerConfig, SchedulerEvent,
    SchedulerObserver, TaskDescriptor, TaskGraph, TaskResult,
};
