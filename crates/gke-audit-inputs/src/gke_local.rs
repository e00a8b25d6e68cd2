use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gke_audit_input::{Input, InputError};
use tracing::debug;

pub const GKE_LOCAL_INPUT_ID: &str = "gkeLocal";
const GKE_LOCAL_INPUT_DESCRIPTION: &str = "GKE cluster data from JSON dump";

/// Serves cluster objects from a JSON dump file.
///
/// The dump is a JSON array of cluster objects, each with a `name` field.
/// The file is read on every call so edits are picked up between runs of a
/// long lived process.
pub struct GkeLocalInput {
  dump_file: PathBuf,
}

impl GkeLocalInput {
  pub fn new(dump_file: impl Into<PathBuf>) -> Self {
    Self {
      dump_file: dump_file.into(),
    }
  }

  pub fn dump_file(&self) -> &Path {
    &self.dump_file
  }

  /// Names of all clusters in the dump, in file order.
  pub async fn cluster_names(&self) -> Result<Vec<String>, InputError> {
    let clusters = self.read_dump().await?;
    Ok(
      clusters
        .iter()
        .filter_map(|c| c.get("name").and_then(|n| n.as_str()))
        .map(str::to_string)
        .collect(),
    )
  }

  async fn read_dump(&self) -> Result<Vec<serde_json::Value>, InputError> {
    debug!(file = %self.dump_file.display(), "reading cluster dump");
    let content = tokio::fs::read_to_string(&self.dump_file).await?;
    Ok(serde_json::from_str(&content)?)
  }
}

#[async_trait]
impl Input for GkeLocalInput {
  fn id(&self) -> &str {
    GKE_LOCAL_INPUT_ID
  }

  fn description(&self) -> &str {
    GKE_LOCAL_INPUT_DESCRIPTION
  }

  async fn get_data(&self, cluster_id: &str) -> Result<serde_json::Value, InputError> {
    self
      .read_dump()
      .await?
      .into_iter()
      .find(|c| c.get("name").and_then(|n| n.as_str()) == Some(cluster_id))
      .ok_or_else(|| InputError::cluster_not_found(cluster_id))
  }

  async fn close(&self) -> Result<(), InputError> {
    Ok(())
  }
}
