use std::collections::HashMap;

use serde::Serialize;

use crate::error::TaskFailure;

/// Final outcome of one task, written once when the task settles.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult<T> {
    /// Task identifier
    pub id: String,

    /// Value produced by the successful attempt
    pub value: Option<T>,

    /// Wall-clock time from first start to settlement, including backoff
    pub duration_ms: u64,

    pub succeeded: bool,

    /// Message of the last failure (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Number of retries used (attempts - 1)
    pub retry_count: u32,

    #[serde(skip)]
    pub failure: Option<TaskFailure>,
}

impl<T> TaskResult<T> {
    pub fn success(id: impl Into<String>, value: T, duration_ms: u64, retry_count: u32) -> Self {
        Self {
            id: id.into(),
            value: Some(value),
            duration_ms,
            succeeded: true,
            error_message: None,
            retry_count,
            failure: None,
        }
    }

    pub fn failure(
        id: impl Into<String>,
        failure: TaskFailure,
        duration_ms: u64,
        retry_count: u32,
    ) -> Self {
        Self {
            id: id.into(),
            value: None,
            duration_ms,
            succeeded: false,
            error_message: Some(failure.to_string()),
            retry_count,
            failure: Some(failure),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Empty,
    AllSucceeded,
    PartialSuccess,
    AllFailed,
}

/// Aggregate view over a result map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_retries: u32,
    /// Slowest task duration, a lower bound for the run's wall time
    pub max_duration_ms: u64,
    pub failed_ids: Vec<String>,
    pub outcome: RunOutcome,
}

impl RunSummary {
    pub fn from_results<T>(results: &HashMap<String, TaskResult<T>>) -> Self {
        let mut failed_ids: Vec<String> = results
            .values()
            .filter(|r| !r.succeeded)
            .map(|r| r.id.clone())
            .collect();
        failed_ids.sort();

        let total = results.len();
        let failed = failed_ids.len();
        let succeeded = total - failed;

        let outcome = match (succeeded, failed) {
            (0, 0) => RunOutcome::Empty,
            (_, 0) => RunOutcome::AllSucceeded,
            (0, _) => RunOutcome::AllFailed,
            _ => RunOutcome::PartialSuccess,
        };

        Self {
            total,
            succeeded,
            failed,
            total_retries: results.values().map(|r| r.retry_count).sum(),
            max_duration_ms: results.values().map(|r| r.duration_ms).max().unwrap_or(0),
            failed_ids,
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::AllSucceeded | RunOutcome::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_distinguishes_partial_from_total_failure() {
        let mut results: HashMap<String, TaskResult<()>> = HashMap::new();
        assert_eq!(RunSummary::from_results(&results).outcome, RunOutcome::Empty);

        results.insert("a".into(), TaskResult::success("a", (), 5, 1));
        assert_eq!(
            RunSummary::from_results(&results).outcome,
            RunOutcome::AllSucceeded
        );

        results.insert(
            "b".into(),
            TaskResult::failure("b", TaskFailure::Failed("boom".into()), 9, 2),
        );
        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.outcome, RunOutcome::PartialSuccess);
        assert_eq!(summary.total_retries, 3);
        assert_eq!(summary.max_duration_ms, 9);
        assert_eq!(summary.failed_ids, vec!["b".to_string()]);
        assert!(!summary.is_success());

        results.remove("a");
        assert_eq!(
            RunSummary::from_results(&results).outcome,
            RunOutcome::AllFailed
        );
    }

    #[test]
    fn failure_message_comes_from_display() {
        let r: TaskResult<()> =
            TaskResult::failure("t", TaskFailure::TimedOut { timeout_ms: 50 }, 50, 0);
        assert_eq!(r.error_message.as_deref(), Some("timed out after 50ms"));
        assert!(r.value.is_none());
    }
}
