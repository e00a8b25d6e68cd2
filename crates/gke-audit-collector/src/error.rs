use gke_audit_input::InputError;
use thiserror::Error;

/// A failed fetch, tagged with the cluster and input that produced it.
#[derive(Debug, Error)]
#[error("failed to fetch data for cluster {cluster_id}, input {input_id}: {source}")]
pub struct AttributedError {
  pub cluster_id: String,
  pub input_id: String,
  #[source]
  pub source: InputError,
}
