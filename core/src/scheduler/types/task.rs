use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

/// A unit of work: called once per attempt, each call yields a fresh future.
pub type WorkFn<T> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;

/// One schedulable unit of work with its metadata.
pub struct TaskDescriptor<T> {
    pub id: String,
    pub work: WorkFn<T>,
    /// Higher runs first among ready tasks
    pub priority: i64,
    pub dependencies: Vec<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

impl<T: Send + 'static> TaskDescriptor<T> {
    pub fn new<F, Fut>(id: impl Into<String>, work: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            id: id.into(),
            work: Arc::new(move || work().boxed()),
            priority: 0,
            dependencies: Vec::new(),
            timeout_ms: None,
            max_retries: None,
        }
    }
}

impl<T> TaskDescriptor<T> {
    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

impl<T> Clone for TaskDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            work: Arc::clone(&self.work),
            priority: self.priority,
            dependencies: self.dependencies.clone(),
            timeout_ms: self.timeout_ms,
            max_retries: self.max_retries,
        }
    }
}

impl<T> fmt::Debug for TaskDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDescriptor")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("dependencies", &self.dependencies)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Common task interface for dependency graph handling.
pub trait TaskLike {
    fn id(&self) -> &str;
    fn dependencies(&self) -> &[String];
}

impl<T> TaskLike for TaskDescriptor<T> {
    fn id(&self) -> &str {
        &self.id
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}
