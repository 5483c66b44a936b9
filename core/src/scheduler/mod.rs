//! Dependency-aware task scheduler with bounded concurrency.
//!
//! It supports:
//! - Priority ordering among ready tasks (stable for equal priority)
//! - Per-task timeouts and retry with backoff
//! - Event-driven dependency resolution (no polling)
//! - Configurable handling of failed, unknown and cyclic dependencies
//! - Chunked execution of very large task sets
//!
//! # Architecture
//!
//! ```text
//! Vec<TaskDescriptor<T>>
//!   ↓
//! TaskGraph::from_tasks() → edges, reverse_edges, missing deps
//!   ↓
//! Scheduler::run() → ReadyQueue ⇄ in-flight attempts (≤ max_concurrency)
//!   ↓
//! HashMap<id, TaskResult<T>>
//! ```

mod batch;
mod graph;
mod progress;
mod queue;
#[allow(clippy::module_inception)]
mod scheduler;
pub mod traits;
pub mod types;

pub use batch::BatchRunner;
pub use graph::TaskGraph;
pub use progress::ProgressMonitor;
pub use scheduler::{run_tasks, Scheduler, SchedulerBuilder};
pub use traits::{
    ExponentialBackoff, ObserverChain, RetryStrategy, SchedulerEvent, SchedulerObserver,
};
pub use types::{
    RunOutcome, RunSummary, SchedulerConfig, TaskDescriptor, TaskLike, TaskResult, WorkFn,
};
