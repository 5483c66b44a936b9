use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::config::BatchConfig;
use crate::error::SchedulerError;

use super::scheduler::Scheduler;
use super::types::{TaskDescriptor, TaskResult};

/// Feeds a large task collection to a [`Scheduler`] in fixed-size chunks.
///
/// Chunks run one after another and share no scheduling state: a dependency
/// on a task from another chunk is an unknown dependency for that chunk.
#[derive(Clone)]
pub struct BatchRunner {
    scheduler: Scheduler,
    batch_size: usize,
    pause: Duration,
}

impl BatchRunner {
    pub fn new(scheduler: Scheduler, batch_size: usize) -> Self {
        Self {
            scheduler,
            batch_size,
            pause: Duration::ZERO,
        }
    }

    pub fn from_config(scheduler: Scheduler, config: &BatchConfig) -> Self {
        Self::new(scheduler, config.size).with_pause(Duration::from_millis(config.pause_ms))
    }

    /// Pause inserted between consecutive chunks.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub async fn run<T: Send + 'static>(
        &self,
        tasks: Vec<TaskDescriptor<T>>,
    ) -> Result<HashMap<String, TaskResult<T>>, SchedulerError> {
        if self.batch_size == 0 {
            return Err(SchedulerError::InvalidConfig(
                "batch size must be greater than 0".into(),
            ));
        }

        // Results are merged by id, so ids must be unique across chunks too
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(SchedulerError::DuplicateTaskId(task.id.clone()));
            }
        }

        let total_batches = tasks.len().div_ceil(self.batch_size);
        let mut results = HashMap::with_capacity(tasks.len());
        let mut remaining = tasks.into_iter().peekable();
        let mut batch = 0;

        while remaining.peek().is_some() {
            batch += 1;
            let chunk: Vec<_> = remaining.by_ref().take(self.batch_size).collect();
            tracing::info!(
                "Running batch {}/{} ({} tasks)",
                batch,
                total_batches,
                chunk.len()
            );

            results.extend(self.scheduler.run(chunk).await?);

            if remaining.peek().is_some() && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        Ok(results)
    }
}
