//! Plan model, validation and normalization.
//!
//! ```text
//! raw JSON ─► validate_record ─► ignore filter ─► convention check
//!          ─► consolidate ─► renumber ─► ExecutionPlan ─► plan_to_tasks
//! ```

pub mod convention;
mod extract;
pub mod ignore;
mod normalizer;
pub mod path;
mod tasks;
mod types;
mod validator;

pub use convention::{ConventionRule, ConventionSet, RuleScope};
pub use extract::extract_plan_json;
pub use ignore::{is_step_ignored, IgnoreFilter, IgnoreRules, NoIgnore};
pub use normalizer::{consolidate, normalize, renumber, PlanNormalizer, MODIFICATION_DELIMITER};
pub use path::check_path;
pub use tasks::{plan_to_tasks, step_dependencies, step_task_id, StepExecutor, StepOutput};
pub use types::{ActionKind, ExecutionPlan, FileSource, PlanStep, StepKind};
pub use validator::{validate_fields, validate_record};
