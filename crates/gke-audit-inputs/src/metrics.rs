//! Prometheus HTTP API input.
//!
//! Every configured [`MetricQuery`] is templated with the cluster attributes
//! and sent to `<address>/api/v1/query`. The vector result is folded into a
//! [`Metric`]:
//!
//! ```text
//! 1 sample     -> { "name": "nodes", "scalar": 3.0 }
//! n samples    -> { "name": "pods",  "vector": { "<label value>": { ... : value } } }
//! 0 samples    -> skipped with a warning
//! ```
//!
//! Vector keys follow the label values of each sample, ordered by label name.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};
use gke_audit_input::{ClusterId, Input, InputError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::USER_AGENT;

pub const METRICS_INPUT_ID: &str = "metricsAPI";
const METRICS_INPUT_DESCRIPTION: &str = "Cluster metrics data from Prometheus API";

const DEFAULT_MAX_QUERIES: usize = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const WILDCARD_CLUSTER_ID: &str = "$CLUSTER_ID";
const WILDCARD_CLUSTER_PROJECT: &str = "$CLUSTER_PROJECT";
const WILDCARD_CLUSTER_LOCATION: &str = "$CLUSTER_LOCATION";
const WILDCARD_CLUSTER_NAME: &str = "$CLUSTER_NAME";

/// A named PromQL query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricQuery {
  pub name: String,
  pub query: String,
}

impl MetricQuery {
  pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      query: query.into(),
    }
  }
}

/// Result of a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scalar: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub vector: Option<Map<String, Value>>,
}

pub struct MetricsInputBuilder {
  address: String,
  queries: Vec<MetricQuery>,
  credentials: Option<(String, String)>,
  max_queries: usize,
  timeout: Duration,
}

impl MetricsInputBuilder {
  pub fn new(address: impl Into<String>, queries: Vec<MetricQuery>) -> Self {
    Self {
      address: address.into(),
      queries,
      credentials: None,
      max_queries: DEFAULT_MAX_QUERIES,
      timeout: DEFAULT_TIMEOUT,
    }
  }

  /// Basic auth credentials sent with every query.
  pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
    self.credentials = Some((username.into(), password.into()));
    self
  }

  /// Maximum number of queries in flight per cluster. Zero keeps the default.
  pub fn with_max_queries(mut self, max_queries: usize) -> Self {
    if max_queries > 0 {
      self.max_queries = max_queries;
    }
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn build(self) -> Result<MetricsInput, InputError> {
    let client = Client::builder()
      .timeout(self.timeout)
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| InputError::fetch(format!("failed to build http client: {}", e)))?;

    Ok(MetricsInput {
      client,
      query_url: format!("{}/api/v1/query", self.address.trim_end_matches('/')),
      queries: self.queries,
      credentials: self.credentials,
      max_queries: self.max_queries,
    })
  }
}

/// Runs the configured Prometheus queries for each cluster.
pub struct MetricsInput {
  client: Client,
  query_url: String,
  queries: Vec<MetricQuery>,
  credentials: Option<(String, String)>,
  max_queries: usize,
}

impl MetricsInput {
  /// Run one query. `Ok(None)` means the query returned no samples.
  async fn get_metric(&self, query: &MetricQuery, cluster_id: &str) -> Result<Option<Metric>, InputError> {
    let promql = replace_wildcards(cluster_id, &query.query);
    debug!(metric = %query.name, query = %promql, "querying prometheus");

    let mut request = self.client.get(&self.query_url).query(&[("query", promql.as_str())]);
    if let Some((username, password)) = &self.credentials {
      request = request.basic_auth(username, Some(password));
    }

    let response = request
      .send()
      .await
      .map_err(|e| InputError::fetch(e.to_string()))?;
    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| InputError::fetch(e.to_string()))?;

    let parsed: QueryResponse = serde_json::from_str(&body).map_err(|e| {
      InputError::fetch(format!("invalid prometheus response (status {}): {}", status, e))
    })?;

    if parsed.status != "success" {
      return Err(InputError::fetch(format!(
        "query {:?} failed: {}",
        promql,
        parsed.error.unwrap_or_else(|| status.to_string())
      )));
    }
    for warning in &parsed.warnings {
      warn!(metric = %query.name, warning = %warning, "prometheus query warning");
    }

    let data = parsed
      .data
      .ok_or_else(|| InputError::fetch(format!("query {:?} returned no data", promql)))?;
    if data.result_type != "vector" {
      return Err(InputError::fetch(format!(
        "unsupported result format: {}",
        data.result_type
      )));
    }

    let samples: Vec<Sample> = serde_json::from_value(data.result)?;
    if samples.is_empty() {
      warn!(metric = %query.name, query = %promql, "metric query returned no results");
      return Ok(None);
    }

    metric_from_samples(&query.name, samples).map(Some)
  }
}

#[async_trait]
impl Input for MetricsInput {
  fn id(&self) -> &str {
    METRICS_INPUT_ID
  }

  fn description(&self) -> &str {
    METRICS_INPUT_DESCRIPTION
  }

  async fn get_data(&self, cluster_id: &str) -> Result<Value, InputError> {
    let queries: Vec<_> = self
      .queries
      .iter()
      .map(|query| self.get_metric(query, cluster_id))
      .collect();
    let metrics: Vec<Option<Metric>> = stream::iter(queries)
      .buffer_unordered(self.max_queries)
      .try_collect()
      .await?;

    let by_name: BTreeMap<String, Metric> = metrics
      .into_iter()
      .flatten()
      .map(|m| (m.name.clone(), m))
      .collect();
    Ok(serde_json::to_value(by_name)?)
  }

  async fn close(&self) -> Result<(), InputError> {
    debug!("closing metrics input");
    Ok(())
  }
}

#[derive(Deserialize)]
struct QueryResponse {
  status: String,
  #[serde(default)]
  data: Option<QueryData>,
  #[serde(default)]
  error: Option<String>,
  #[serde(default)]
  warnings: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
  result_type: String,
  result: Value,
}

#[derive(Deserialize)]
struct Sample {
  #[serde(default)]
  metric: BTreeMap<String, String>,
  /// `[<unix time>, "<value>"]`
  value: (f64, String),
}

impl Sample {
  fn value(&self) -> Result<f64, InputError> {
    self
      .value
      .1
      .parse()
      .map_err(|_| InputError::fetch(format!("invalid sample value {:?}", self.value.1)))
  }
}

fn metric_from_samples(name: &str, samples: Vec<Sample>) -> Result<Metric, InputError> {
  if let [sample] = samples.as_slice() {
    return Ok(Metric {
      name: name.to_string(),
      scalar: Some(sample.value()?),
      vector: None,
    });
  }

  let mut vector = Map::new();
  for sample in &samples {
    // BTreeMap iterates in label name order
    let labels: Vec<&str> = sample.metric.values().map(String::as_str).collect();
    if labels.is_empty() {
      return Err(InputError::fetch("metric query result has no labels"));
    }
    insert_nested(&mut vector, &labels, sample.value()?);
  }

  Ok(Metric {
    name: name.to_string(),
    scalar: None,
    vector: Some(vector),
  })
}

fn insert_nested(map: &mut Map<String, Value>, labels: &[&str], value: f64) {
  match labels {
    [] => {}
    [last] => {
      map.insert(last.to_string(), Value::from(value));
    }
    [first, rest @ ..] => {
      let entry = map
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
      if !entry.is_object() {
        *entry = Value::Object(Map::new());
      }
      if let Value::Object(inner) = entry {
        insert_nested(inner, rest, value);
      }
    }
  }
}

fn quoted(value: &str) -> String {
  format!("\"{}\"", value)
}

/// Replace cluster wildcards in a PromQL query with quoted values.
///
/// Project, location and name are only replaced when the id parses as a
/// fully qualified cluster id.
pub(crate) fn replace_wildcards(cluster_id: &str, query: &str) -> String {
  let result = query.replace(WILDCARD_CLUSTER_ID, &quoted(cluster_id));
  match ClusterId::parse(cluster_id) {
    Ok(id) => result
      .replace(WILDCARD_CLUSTER_PROJECT, &quoted(&id.project))
      .replace(WILDCARD_CLUSTER_LOCATION, &quoted(&id.location))
      .replace(WILDCARD_CLUSTER_NAME, &quoted(&id.name)),
    Err(e) => {
      warn!(cluster_id = %cluster_id, error = %e, "failed to replace some wildcards");
      result
    }
  }
}
