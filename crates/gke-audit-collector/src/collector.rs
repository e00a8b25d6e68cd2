//! Collection orchestration.

use futures::future::join_all;
use gke_audit_input::SharedInput;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::aggregate::{aggregate_errors, aggregate_results};
use crate::config::CollectorConfig;
use crate::result::CollectionResult;
use crate::task::build_task_queue;
use crate::worker::{WorkerChannels, run_worker};

/// Fetches data from a set of inputs for a set of clusters.
///
/// Handles task fan-out over a bounded pool of workers and folds their
/// outcomes into a [`CollectionResult`]. Collection never fails as a whole:
/// per-task failures are returned alongside whatever succeeded, and the
/// caller decides what to do with them.
#[derive(Debug, Clone, Default)]
pub struct DataCollector {
  config: CollectorConfig,
}

impl DataCollector {
  /// Create a new collector.
  pub fn new(config: CollectorConfig) -> Self {
    Self { config }
  }

  /// Get the collector configuration.
  pub fn config(&self) -> &CollectorConfig {
    &self.config
  }

  /// Fetch data from every input for every cluster.
  pub async fn collect(&self, inputs: &[SharedInput], cluster_ids: &[String]) -> CollectionResult {
    self
      .collect_with_cancel(inputs, cluster_ids, CancellationToken::new())
      .await
  }

  /// Fetch data from every input for every cluster, stopping early on cancel.
  ///
  /// After `cancel` fires no new fetch is started. Fetches already in flight
  /// run to completion. Tasks that were never started are reported as
  /// cancelled errors, so the result still accounts for every task.
  #[instrument(
    name = "collect",
    skip_all,
    fields(
      inputs = inputs.len(),
      clusters = cluster_ids.len(),
    )
  )]
  pub async fn collect_with_cancel(
    &self,
    inputs: &[SharedInput],
    cluster_ids: &[String],
    cancel: CancellationToken,
  ) -> CollectionResult {
    let collection_id = uuid::Uuid::new_v4().to_string();

    let (queue, task_count) = build_task_queue(inputs, cluster_ids);
    if task_count == 0 {
      info!(collection_id = %collection_id, "no inputs or no clusters, nothing to collect");
      return CollectionResult::default();
    }

    let worker_count = self.config.worker_count(task_count);
    info!(
      collection_id = %collection_id,
      inputs = inputs.len(),
      clusters = cluster_ids.len(),
      tasks = task_count,
      workers = worker_count,
      "collection_started"
    );

    let (success_tx, success_rx) = mpsc::unbounded_channel();
    let (failure_tx, failure_rx) = mpsc::unbounded_channel();

    let handles: Vec<_> = (0..worker_count)
      .map(|worker_id| {
        let channels = WorkerChannels {
          successes: success_tx.clone(),
          failures: failure_tx.clone(),
        };
        tokio::spawn(run_worker(worker_id, queue.clone(), channels, cancel.clone()))
      })
      .collect();

    // Workers now own the only senders; the channels close when the last one exits.
    drop(success_tx);
    drop(failure_tx);

    let (joined, clusters, errors) = tokio::join!(
      join_all(handles),
      aggregate_results(success_rx),
      aggregate_errors(failure_rx),
    );

    for result in joined {
      if let Err(e) = result {
        error!(collection_id = %collection_id, error = %e, "worker terminated abnormally");
      }
    }

    if cancel.is_cancelled() {
      warn!(collection_id = %collection_id, "collection cancelled");
    }

    info!(
      collection_id = %collection_id,
      clusters = clusters.len(),
      errors = errors.len(),
      "collection_completed"
    );

    CollectionResult { clusters, errors }
  }
}

/// Fetch data from every input for every cluster using the default
/// configuration.
pub async fn get_all_inputs_data(inputs: &[SharedInput], cluster_ids: &[String]) -> CollectionResult {
  DataCollector::default().collect(inputs, cluster_ids).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::MockInput;
  use serde_json::json;

  fn clusters(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
  }

  #[tokio::test]
  async fn test_get_all_inputs_data() {
    let cluster_ids = clusters(&["cluster-one", "cluster-two", "cluster-three", "cluster-four"]);
    let inputs = vec![
      MockInput::ok("gke-api", json!("data")),
      MockInput::ok("kube-api", json!("data")),
      MockInput::ok("metrics-api", json!("data")),
      MockInput::failing("bad-api", "error"),
    ];

    let result = get_all_inputs_data(&inputs, &cluster_ids).await;

    assert_eq!(result.clusters.len(), cluster_ids.len());
    assert_eq!(result.errors.len(), cluster_ids.len());
    assert!(!result.is_complete());
    assert_eq!(result.success_count(), 12);

    for cluster_id in &cluster_ids {
      let record = &result.clusters[cluster_id];
      assert_eq!(record.data.len(), 3);
      assert_eq!(record.data["gke-api"], json!("data"));
      assert_eq!(record.data["kube-api"], json!("data"));
      assert_eq!(record.data["metrics-api"], json!("data"));
      assert!(!record.data.contains_key("bad-api"));
    }

    let mut error_clusters: Vec<&str> = result.errors.iter().map(|e| e.cluster_id.as_str()).collect();
    error_clusters.sort();
    assert_eq!(
      error_clusters,
      vec!["cluster-four", "cluster-one", "cluster-three", "cluster-two"]
    );
    assert!(result.errors.iter().all(|e| e.input_id == "bad-api"));
  }

  #[tokio::test]
  async fn test_empty_inputs_or_clusters() {
    let collector = DataCollector::default();

    let result = collector.collect(&[], &clusters(&["a", "b"])).await;
    assert!(result.clusters.is_empty());
    assert!(result.errors.is_empty());

    let inputs = vec![MockInput::ok("a", json!(1))];
    let result = collector.collect(&inputs, &[]).await;
    assert!(result.clusters.is_empty());
    assert!(result.errors.is_empty());
  }

  #[tokio::test]
  async fn test_zero_max_workers_still_collects() {
    let collector = DataCollector::new(CollectorConfig { max_workers: 0 });
    let inputs = vec![MockInput::ok("a", json!(1))];

    let result = collector.collect(&inputs, &clusters(&["x", "y"])).await;
    assert_eq!(result.clusters.len(), 2);
    assert!(result.is_complete());
  }
}
