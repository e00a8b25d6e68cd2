use std::time::Duration;

use async_trait::async_trait;
use gke_audit_input::{Input, InputError};
use reqwest::Client;
use tracing::debug;

use crate::USER_AGENT;

pub const REST_INPUT_ID: &str = "rest";
const REST_INPUT_DESCRIPTION: &str = "Generic REST API input with HTTPs transport and JSON encoding. CLUSTER_ID wildcard can be used in the endpoint path.";

/// Placeholder in the endpoint that is replaced with the cluster id.
pub const CLUSTER_ID_WILDCARD: &str = "CLUSTER_ID";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Fetches a JSON document per cluster from an HTTP endpoint.
pub struct RestInput {
  client: Client,
  endpoint: String,
}

impl RestInput {
  /// Create a REST input with the default 3 second timeout.
  pub fn new(endpoint: impl Into<String>) -> Result<Self, InputError> {
    Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
  }

  pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, InputError> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| InputError::fetch(format!("failed to build http client: {}", e)))?;

    Ok(Self {
      client,
      endpoint: endpoint.into(),
    })
  }

  /// Endpoint URL for the given cluster.
  fn url_for(&self, cluster_id: &str) -> String {
    self.endpoint.replace(CLUSTER_ID_WILDCARD, cluster_id)
  }
}

#[async_trait]
impl Input for RestInput {
  fn id(&self) -> &str {
    REST_INPUT_ID
  }

  fn description(&self) -> &str {
    REST_INPUT_DESCRIPTION
  }

  async fn get_data(&self, cluster_id: &str) -> Result<serde_json::Value, InputError> {
    let url = self.url_for(cluster_id);
    debug!(url = %url, "fetching rest input");

    let response = self
      .client
      .get(&url)
      .send()
      .await
      .map_err(|e| InputError::fetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      return Err(InputError::fetch(format!(
        "unexpected status {} from {}",
        status, url
      )));
    }

    let body = response
      .text()
      .await
      .map_err(|e| InputError::fetch(e.to_string()))?;
    Ok(serde_json::from_str(&body)?)
  }

  async fn close(&self) -> Result<(), InputError> {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_url_for_replaces_every_wildcard() {
    let input = RestInput::new("https://example.com/CLUSTER_ID/data?id=CLUSTER_ID").unwrap();
    assert_eq!(
      input.url_for("projects/p/locations/l/clusters/c"),
      "https://example.com/projects/p/locations/l/clusters/c/data?id=projects/p/locations/l/clusters/c"
    );
  }

  #[test]
  fn test_url_without_wildcard() {
    let input = RestInput::new("https://example.com/data").unwrap();
    assert_eq!(input.url_for("c"), "https://example.com/data");
  }
}
