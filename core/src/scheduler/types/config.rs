use std::time::Duration;

use crate::config::SchedulerSection;
use crate::error::SchedulerError;

/// Runtime knobs for one scheduler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum number of tasks in flight at once (0 = number of CPUs)
    pub max_concurrency: usize,

    /// Per-attempt timeout used when a task does not set its own
    pub default_timeout_ms: u64,

    /// Retry budget used when a task does not set its own
    pub default_max_retries: u32,

    pub enable_retries: bool,

    pub enable_timeout: bool,

    /// Fail dependents of failed, unknown or cyclic dependencies instead of
    /// leaving them unstarted
    pub propagate_dependency_failure: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            default_timeout_ms: 30_000,
            default_max_retries: 2,
            enable_retries: true,
            enable_timeout: true,
            propagate_dependency_failure: true,
        }
    }
}

impl SchedulerConfig {
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Concurrency cap with `0` resolved to the CPU count.
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrency == 0 {
            num_cpus::get().max(1)
        } else {
            self.max_concurrency
        }
    }

    pub fn timeout_for(&self, task_timeout_ms: Option<u64>) -> Option<Duration> {
        if !self.enable_timeout {
            return None;
        }
        Some(Duration::from_millis(
            task_timeout_ms.unwrap_or(self.default_timeout_ms),
        ))
    }

    pub fn retries_for(&self, task_max_retries: Option<u32>) -> u32 {
        if !self.enable_retries {
            return 0;
        }
        task_max_retries.unwrap_or(self.default_max_retries)
    }

    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.enable_timeout && self.default_timeout_ms == 0 {
            return Err(SchedulerError::InvalidConfig(
                "default_timeout_ms must be greater than 0 when timeouts are enabled".into(),
            ));
        }
        Ok(())
    }
}

impl From<&SchedulerSection> for SchedulerConfig {
    fn from(section: &SchedulerSection) -> Self {
        Self {
            max_concurrency: section.max_concurrency,
            default_timeout_ms: section.default_timeout_ms,
            default_max_retries: section.default_max_retries,
            enable_retries: section.enable_retries,
            enable_timeout: section.enable_timeout,
            propagate_dependency_failure: section.propagate_dependency_failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_overrides_win_over_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.timeout_for(Some(10)), Some(Duration::from_millis(10)));
        assert_eq!(config.timeout_for(None), Some(Duration::from_millis(30_000)));
        assert_eq!(config.retries_for(Some(5)), 5);
        assert_eq!(config.retries_for(None), 2);
    }

    #[test]
    fn disabled_features_ignore_overrides() {
        let config = SchedulerConfig {
            enable_retries: false,
            enable_timeout: false,
            ..Default::default()
        };
        assert_eq!(config.timeout_for(Some(10)), None);
        assert_eq!(config.retries_for(Some(5)), 0);
    }

    #[test]
    fn zero_concurrency_means_cpu_count() {
        let config = SchedulerConfig::default().with_max_concurrency(0);
        assert!(config.effective_concurrency() >= 1);
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = SchedulerConfig {
            default_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
