use std::time::Duration;

use crate::scheduler::types::RunSummary;

/// Lifecycle events emitted by the scheduler loop.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    RunStart {
        run_id: String,
        total_tasks: usize,
        max_concurrency: usize,
    },
    TaskStart {
        run_id: String,
        task_id: String,
        attempt: u32,
    },
    TaskRetry {
        run_id: String,
        task_id: String,
        retry: u32,
        delay: Duration,
        error: String,
    },
    TaskComplete {
        run_id: String,
        task_id: String,
        succeeded: bool,
        duration_ms: u64,
        retry_count: u32,
        error: Option<String>,
    },
    RunEnd {
        run_id: String,
        summary: RunSummary,
    },
}

impl SchedulerEvent {
    pub fn run_id(&self) -> &str {
        match self {
            Self::RunStart { run_id, .. }
            | Self::TaskStart { run_id, .. }
            | Self::TaskRetry { run_id, .. }
            | Self::TaskComplete { run_id, .. }
            | Self::RunEnd { run_id, .. } => run_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStart { .. } => "run.start",
            Self::TaskStart { .. } => "task.start",
            Self::TaskRetry { .. } => "task.retry",
            Self::TaskComplete { .. } => "task.end",
            Self::RunEnd { .. } => "run.end",
        }
    }
}

/// Receives scheduler events; must not block.
pub trait SchedulerObserver: Send + Sync {
    fn name(&self) -> &str;
    fn on_event(&self, event: &SchedulerEvent);
}

/// Fan out events to several observers in order.
#[derive(Default)]
pub struct ObserverChain {
    observers: Vec<std::sync::Arc<dyn SchedulerObserver>>,
}

impl ObserverChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: std::sync::Arc<dyn SchedulerObserver>) {
        self.observers.push(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl SchedulerObserver for ObserverChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn on_event(&self, event: &SchedulerEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}
