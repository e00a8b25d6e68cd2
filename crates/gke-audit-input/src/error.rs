use thiserror::Error;

/// Errors an input can return when fetching data for a cluster.
#[derive(Debug, Error)]
pub enum InputError {
  /// The input has no data for the requested cluster.
  #[error("cluster {cluster_id} not found")]
  ClusterNotFound { cluster_id: String },

  /// The cluster identifier does not have the shape the input needs.
  #[error("invalid cluster identifier '{cluster_id}': {message}")]
  InvalidClusterId { cluster_id: String, message: String },

  /// Remote call failed (transport error, bad status, etc.)
  #[error("fetch failed: {message}")]
  Fetch { message: String },

  /// Data could not be decoded.
  #[error("decode error: {0}")]
  Decode(#[from] serde_json::Error),

  /// Local I/O failed.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The fetch was never started because the collection was cancelled.
  #[error("fetch cancelled")]
  Cancelled,

  /// The input panicked instead of returning an error.
  #[error("input panicked: {message}")]
  Panicked { message: String },
}

impl InputError {
  /// Create a fetch error.
  pub fn fetch(message: impl Into<String>) -> Self {
    Self::Fetch {
      message: message.into(),
    }
  }

  /// Create a cluster-not-found error.
  pub fn cluster_not_found(cluster_id: impl Into<String>) -> Self {
    Self::ClusterNotFound {
      cluster_id: cluster_id.into(),
    }
  }
}
