//! Folding task outcomes into the collection result.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::warn;

use crate::error::AttributedError;
use crate::result::ClusterData;
use crate::task::{Failure, Success};

/// Fold successful outcomes into per-cluster data until the channel closes.
pub(crate) async fn aggregate_results(
  mut successes: mpsc::UnboundedReceiver<Success>,
) -> HashMap<String, ClusterData> {
  let mut clusters: HashMap<String, ClusterData> = HashMap::new();

  while let Some(outcome) = successes.recv().await {
    let cluster_id = outcome.cluster_id;
    let record = clusters
      .entry(cluster_id.clone())
      .or_insert_with(|| ClusterData::new(cluster_id.clone()));

    if record
      .data
      .insert(outcome.input_id.clone(), outcome.payload)
      .is_some()
    {
      warn!(
        cluster_id = %cluster_id,
        input_id = %outcome.input_id,
        "input id produced more than one value for cluster, keeping the latest"
      );
    }
  }

  clusters
}

/// Fold failed outcomes into attributed errors until the channel closes.
pub(crate) async fn aggregate_errors(
  mut failures: mpsc::UnboundedReceiver<Failure>,
) -> Vec<AttributedError> {
  let mut errors = Vec::new();

  while let Some(outcome) = failures.recv().await {
    errors.push(AttributedError {
      cluster_id: outcome.cluster_id,
      input_id: outcome.input_id,
      source: outcome.payload,
    });
  }

  errors
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::task::Outcome;
  use gke_audit_input::InputError;
  use serde_json::json;

  fn success(cluster_id: &str, input_id: &str, value: serde_json::Value) -> Success {
    Outcome {
      cluster_id: cluster_id.to_string(),
      input_id: input_id.to_string(),
      payload: value,
    }
  }

  #[tokio::test]
  async fn test_aggregate_results() {
    let (sender, receiver) = mpsc::unbounded_channel();
    sender
      .send(success("cluster-one", "gke-api", json!("cluster-one-gcp-data")))
      .unwrap();
    sender
      .send(success("cluster-one", "kube-api", json!("cluster-one-kube-data")))
      .unwrap();
    sender
      .send(success("cluster-two", "gke-api", json!("cluster-two-gcp-data")))
      .unwrap();
    drop(sender);

    let clusters = aggregate_results(receiver).await;
    assert_eq!(clusters.len(), 2);

    let one = clusters.get("cluster-one").expect("no results for cluster-one");
    assert_eq!(one.name, "cluster-one");
    assert_eq!(one.data.len(), 2);
    assert_eq!(one.data["gke-api"], json!("cluster-one-gcp-data"));
    assert_eq!(one.data["kube-api"], json!("cluster-one-kube-data"));

    let two = clusters.get("cluster-two").expect("no results for cluster-two");
    assert_eq!(two.data.len(), 1);
    assert_eq!(two.data["gke-api"], json!("cluster-two-gcp-data"));
  }

  #[tokio::test]
  async fn test_aggregate_results_duplicate_input_overwrites() {
    let (sender, receiver) = mpsc::unbounded_channel();
    sender.send(success("c", "dup", json!(1))).unwrap();
    sender.send(success("c", "dup", json!(2))).unwrap();
    drop(sender);

    let clusters = aggregate_results(receiver).await;
    assert_eq!(clusters["c"].data.len(), 1);
    assert_eq!(clusters["c"].data["dup"], json!(2));
  }

  #[tokio::test]
  async fn test_aggregate_errors() {
    let (sender, receiver) = mpsc::unbounded_channel();
    for cluster_id in ["cluster-one", "cluster-two"] {
      sender
        .send(Outcome {
          cluster_id: cluster_id.to_string(),
          input_id: "gke-api".to_string(),
          payload: InputError::fetch("error"),
        })
        .unwrap();
    }
    drop(sender);

    let errors = aggregate_errors(receiver).await;
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].cluster_id, "cluster-one");
    assert_eq!(errors[1].cluster_id, "cluster-two");
    assert!(errors.iter().all(|e| e.input_id == "gke-api"));
  }

  #[tokio::test]
  async fn test_aggregate_empty_streams() {
    let (sender, receiver) = mpsc::unbounded_channel::<Success>();
    drop(sender);
    assert!(aggregate_results(receiver).await.is_empty());

    let (sender, receiver) = mpsc::unbounded_channel::<Failure>();
    drop(sender);
    assert!(aggregate_errors(receiver).await.is_empty());
  }
}
