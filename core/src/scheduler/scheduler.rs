use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::{SchedulerError, TaskFailure};

use super::graph::TaskGraph;
use super::queue::ReadyQueue;
use super::traits::{ExponentialBackoff, RetryStrategy, SchedulerEvent, SchedulerObserver};
use super::types::{RunSummary, SchedulerConfig, TaskDescriptor, TaskResult, WorkFn};

/// Dependency-aware task scheduler with a global concurrency cap.
///
/// A single coordinating loop owns all bookkeeping. Tasks become ready when
/// their pending-dependency counter reaches zero, are dequeued by
/// `(priority desc, submission order asc)`, and report back through the
/// loop's completion stream.
#[derive(Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
    retry_strategy: Arc<dyn RetryStrategy>,
    observer: Option<Arc<dyn SchedulerObserver>>,
    cancel: Option<watch::Receiver<bool>>,
}

pub struct SchedulerBuilder {
    config: SchedulerConfig,
    retry_strategy: Option<Arc<dyn RetryStrategy>>,
    observer: Option<Arc<dyn SchedulerObserver>>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(config)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run every task to settlement and return one result per task id.
    ///
    /// Only submission-level problems (duplicate ids, invalid config) are
    /// returned as errors. With `propagate_dependency_failure` disabled,
    /// tasks whose dependencies can never succeed are left out of the map.
    pub async fn run<T: Send + 'static>(
        &self,
        tasks: Vec<TaskDescriptor<T>>,
    ) -> Result<HashMap<String, TaskResult<T>>, SchedulerError> {
        self.config.validate()?;
        let graph = TaskGraph::from_tasks(&tasks)?;

        let run_id = Uuid::new_v4().to_string();
        let max_concurrency = self.config.effective_concurrency();
        let started = Instant::now();

        tracing::info!(
            "Scheduler run {} starting: {} tasks, max concurrency {}",
            run_id,
            tasks.len(),
            max_concurrency
        );
        self.emit(SchedulerEvent::RunStart {
            run_id: run_id.clone(),
            total_tasks: tasks.len(),
            max_concurrency,
        });

        let mut state = RunState::new(self, &run_id, &graph, tasks);
        state.seed();

        let mut cancel_rx = self.cancel.clone();
        let mut cancel_seen = self.is_cancelled();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < max_concurrency && !state.ready.is_empty() {
                let Some(index) = state.ready.pop() else {
                    break;
                };
                if cancel_seen {
                    state.settle(index, TaskFailure::Cancelled.into());
                    continue;
                }
                in_flight.push(state.start(index));
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                Some((index, outcome)) = in_flight.next() => {
                    state.settle(index, outcome);
                }
                _ = wait_cancelled(cancel_rx.as_mut()), if !cancel_seen => {
                    tracing::warn!("Scheduler run {} cancelled", run_id);
                    cancel_seen = true;
                }
            }
        }

        state.finish(cancel_seen);
        let results = state.results;

        let summary = RunSummary::from_results(&results);
        tracing::info!(
            "Scheduler run {} finished in {}ms: {}/{} succeeded, {} retries",
            run_id,
            started.elapsed().as_millis(),
            summary.succeeded,
            summary.total,
            summary.total_retries
        );
        self.emit(SchedulerEvent::RunEnd { run_id, summary });

        Ok(results)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    fn emit(&self, event: SchedulerEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }
}

impl SchedulerBuilder {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            retry_strategy: None,
            observer: None,
            cancel: None,
        }
    }

    pub fn retry_strategy(mut self, strategy: Arc<dyn RetryStrategy>) -> Self {
        self.retry_strategy = Some(strategy);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn SchedulerObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Cancel pending work once the channel carries `true`.
    pub fn cancel_signal(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Scheduler {
        Scheduler {
            config: self.config,
            retry_strategy: self
                .retry_strategy
                .unwrap_or_else(|| Arc::new(ExponentialBackoff::default())),
            observer: self.observer,
            cancel: self.cancel,
        }
    }
}

/// How a task ended, before it is turned into a [`TaskResult`].
enum Outcome<T> {
    Succeeded {
        value: T,
        duration_ms: u64,
        retry_count: u32,
    },
    Failed {
        failure: TaskFailure,
        duration_ms: u64,
        retry_count: u32,
    },
}

impl<T> From<TaskFailure> for Outcome<T> {
    fn from(failure: TaskFailure) -> Self {
        Self::Failed {
            failure,
            duration_ms: 0,
            retry_count: 0,
        }
    }
}

/// Bookkeeping for one run; only the coordinating loop touches it.
struct RunState<'a, T> {
    scheduler: &'a Scheduler,
    run_id: &'a str,
    graph: &'a TaskGraph,
    tasks: Vec<TaskDescriptor<T>>,
    /// Known dependencies not yet succeeded
    pending: Vec<usize>,
    /// Has a dependency that names no submitted task
    blocked: Vec<bool>,
    settled: Vec<bool>,
    ready: ReadyQueue,
    results: HashMap<String, TaskResult<T>>,
}

impl<'a, T: Send + 'static> RunState<'a, T> {
    fn new(
        scheduler: &'a Scheduler,
        run_id: &'a str,
        graph: &'a TaskGraph,
        tasks: Vec<TaskDescriptor<T>>,
    ) -> Self {
        let n = tasks.len();
        Self {
            scheduler,
            run_id,
            graph,
            pending: graph.edges.iter().map(Vec::len).collect(),
            blocked: (0..n)
                .map(|i| !graph.missing_dependencies(i).is_empty())
                .collect(),
            settled: vec![false; n],
            ready: ReadyQueue::default(),
            results: HashMap::with_capacity(n),
            tasks,
        }
    }

    /// Fail unresolvable tasks up front (when propagating) and queue the
    /// dependency-free ones.
    fn seed(&mut self) {
        if self.scheduler.config.propagate_dependency_failure {
            for i in 0..self.tasks.len() {
                if let Some(dep) = self.graph.missing_dependencies(i).first() {
                    let failure = TaskFailure::UnknownDependency {
                        dependency: dep.clone(),
                    };
                    self.settle(i, failure.into());
                }
            }
            // Settle every cycle member before any of them cascades
            let cycles = self
                .graph
                .cycle_members()
                .into_iter()
                .filter(|(i, _)| !self.settled[*i])
                .map(|(i, cycle)| (i, TaskFailure::CircularDependency(cycle).into()))
                .collect();
            self.settle_all(cycles);
        }

        for i in 0..self.tasks.len() {
            if self.is_ready(i) {
                self.ready.push(i, self.tasks[i].priority);
            }
        }
    }

    fn is_ready(&self, index: usize) -> bool {
        !self.settled[index] && !self.blocked[index] && self.pending[index] == 0
    }

    /// Build the future that drives one task through its attempts.
    fn start(
        &self,
        index: usize,
    ) -> impl std::future::Future<Output = (usize, Outcome<T>)> + Send + 'static {
        let task = &self.tasks[index];
        let config = &self.scheduler.config;
        let attempt = Attempt {
            run_id: self.run_id.to_string(),
            task_id: task.id.clone(),
            work: Arc::clone(&task.work),
            timeout: config.timeout_for(task.timeout_ms),
            max_retries: config.retries_for(task.max_retries),
            retry_strategy: Arc::clone(&self.scheduler.retry_strategy),
            observer: self.scheduler.observer.clone(),
            cancel: self.scheduler.cancel.clone(),
        };
        tracing::debug!("Starting task {} ({} more ready)", task.id, self.ready.len());
        async move { (index, attempt.run().await) }
    }

    /// Record a task's final result and release or fail its dependents.
    fn settle(&mut self, index: usize, outcome: Outcome<T>) {
        self.settle_all(vec![(index, outcome)]);
    }

    /// Settle in order; cascaded dependency failures are handled after the
    /// given outcomes.
    fn settle_all(&mut self, outcomes: Vec<(usize, Outcome<T>)>) {
        let mut worklist: VecDeque<(usize, Outcome<T>)> = outcomes.into();

        while let Some((i, outcome)) = worklist.pop_front() {
            if self.settled[i] {
                continue;
            }
            self.settled[i] = true;

            let id = self.tasks[i].id.clone();
            let result = match outcome {
                Outcome::Succeeded {
                    value,
                    duration_ms,
                    retry_count,
                } => TaskResult::success(id.clone(), value, duration_ms, retry_count),
                Outcome::Failed {
                    failure,
                    duration_ms,
                    retry_count,
                } => TaskResult::failure(id.clone(), failure, duration_ms, retry_count),
            };

            if result.succeeded {
                for &dependent in &self.graph.reverse_edges[i] {
                    self.pending[dependent] -= 1;
                    if self.is_ready(dependent) {
                        self.ready.push(dependent, self.tasks[dependent].priority);
                    }
                }
            } else if self.scheduler.config.propagate_dependency_failure {
                for &dependent in &self.graph.reverse_edges[i] {
                    if !self.settled[dependent] {
                        let failure = TaskFailure::DependencyFailed {
                            dependency: id.clone(),
                        };
                        worklist.push_back((dependent, failure.into()));
                    }
                }
            }

            if let Some(error) = &result.error_message {
                tracing::debug!("Task {} failed: {}", id, error);
            }
            self.scheduler.emit(SchedulerEvent::TaskComplete {
                run_id: self.run_id.to_string(),
                task_id: id.clone(),
                succeeded: result.succeeded,
                duration_ms: result.duration_ms,
                retry_count: result.retry_count,
                error: result.error_message.clone(),
            });
            self.results.insert(id, result);
        }
    }

    /// Resolve tasks the loop could not reach.
    fn finish(&mut self, cancelled: bool) {
        let unsettled: Vec<usize> = (0..self.tasks.len()).filter(|&i| !self.settled[i]).collect();
        if unsettled.is_empty() {
            return;
        }

        if cancelled {
            for i in unsettled {
                self.settle(i, TaskFailure::Cancelled.into());
            }
            return;
        }

        let ids: Vec<&str> = unsettled.iter().map(|&i| self.tasks[i].id.as_str()).collect();
        tracing::warn!(
            "Scheduler run {} stalled: {} task(s) never became ready: {}",
            self.run_id,
            ids.len(),
            ids.join(", ")
        );
    }
}

/// Everything a running task needs, detached from the loop's borrows.
struct Attempt<T> {
    run_id: String,
    task_id: String,
    work: WorkFn<T>,
    timeout: Option<Duration>,
    max_retries: u32,
    retry_strategy: Arc<dyn RetryStrategy>,
    observer: Option<Arc<dyn SchedulerObserver>>,
    cancel: Option<watch::Receiver<bool>>,
}

impl<T: Send + 'static> Attempt<T> {
    async fn run(mut self) -> Outcome<T> {
        let started = Instant::now();
        let mut retries = 0u32;

        loop {
            if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
                return self.failed(TaskFailure::Cancelled, started, retries);
            }

            self.emit(SchedulerEvent::TaskStart {
                run_id: self.run_id.clone(),
                task_id: self.task_id.clone(),
                attempt: retries + 1,
            });

            let failure = match self.attempt_once().await {
                Ok(value) => {
                    return Outcome::Succeeded {
                        value,
                        duration_ms: elapsed_ms(started),
                        retry_count: retries,
                    }
                }
                Err(failure) => failure,
            };

            if !failure.is_retryable() || retries >= self.max_retries {
                return self.failed(failure, started, retries);
            }

            retries += 1;
            let delay = self.retry_strategy.delay_for(retries);
            tracing::warn!(
                "Task {} failed (retry {}/{} in {}ms): {}",
                self.task_id,
                retries,
                self.max_retries,
                delay.as_millis(),
                failure
            );
            self.emit(SchedulerEvent::TaskRetry {
                run_id: self.run_id.clone(),
                task_id: self.task_id.clone(),
                retry: retries,
                delay,
                error: failure.to_string(),
            });

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = wait_cancelled(self.cancel.as_mut()) => {
                    return self.failed(TaskFailure::Cancelled, started, retries);
                }
            }
        }
    }

    /// One call to `work()`, raced against the timeout when one is set.
    ///
    /// The work runs on its own tokio task so a panic is reported as a
    /// failure and an expired attempt can be aborted.
    async fn attempt_once(&self) -> Result<T, TaskFailure> {
        let mut handle = tokio::spawn((self.work)());

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    let timeout_ms = limit.as_millis() as u64;
                    tracing::warn!("Task {} timed out after {}ms", self.task_id, timeout_ms);
                    return Err(TaskFailure::TimedOut { timeout_ms });
                }
            },
            None => handle.await,
        };

        match joined {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(TaskFailure::Failed(format!("{err:#}"))),
            Err(join_err) if join_err.is_panic() => {
                Err(TaskFailure::Failed(panic_message(join_err.into_panic())))
            }
            Err(_) => Err(TaskFailure::Cancelled),
        }
    }

    fn failed(&self, failure: TaskFailure, started: Instant, retries: u32) -> Outcome<T> {
        Outcome::Failed {
            failure,
            duration_ms: elapsed_ms(started),
            retry_count: retries,
        }
    }

    fn emit(&self, event: SchedulerEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }
}

/// Resolves once the signal reads `true`; never resolves without a signal
/// or after the sender is dropped.
async fn wait_cancelled(cancel: Option<&mut watch::Receiver<bool>>) {
    match cancel {
        Some(rx) => {
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("task panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("task panicked: {msg}")
    } else {
        "task panicked".to_string()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Run tasks with a default scheduler built from `config`.
pub async fn run_tasks<T: Send + 'static>(
    tasks: Vec<TaskDescriptor<T>>,
    config: SchedulerConfig,
) -> Result<HashMap<String, TaskResult<T>>, SchedulerError> {
    Scheduler::new(config).run(tasks).await
}
