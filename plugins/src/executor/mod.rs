pub mod dry_run;
pub mod renderers;
pub mod strategies;

pub use dry_run::DryRunExecutor;
pub use renderers::{JsonlRendererPlugin, TextRendererPlugin};
pub use strategies::{exponential_from_config, FixedDelayPlugin, LinearBackoffPlugin};
