/// Number of workers used when nothing else is configured.
pub const DEFAULT_MAX_WORKERS: usize = 20;

/// Configuration for the data collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
  /// Maximum number of concurrent `get_data` calls.
  ///
  /// This bounds outbound connections to the APIs behind the inputs.
  /// Values below 1 are treated as 1.
  pub max_workers: usize,
}

impl CollectorConfig {
  /// Worker count actually used for a collection of `task_count` tasks.
  pub(crate) fn worker_count(&self, task_count: usize) -> usize {
    self.max_workers.max(1).min(task_count)
  }
}

impl Default for CollectorConfig {
  fn default() -> Self {
    Self {
      max_workers: DEFAULT_MAX_WORKERS,
    }
  }
}
