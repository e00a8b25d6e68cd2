use serde::{Deserialize, Serialize};

/// Input definitions, one optional block per input kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InputsDef {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gke_local: Option<GkeLocalInputDef>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rest: Option<RestInputDef>,
  #[serde(
    default,
    rename = "metricsAPI",
    skip_serializing_if = "Option::is_none"
  )]
  pub metrics_api: Option<MetricsInputDef>,
}

impl InputsDef {
  pub fn gke_local_enabled(&self) -> bool {
    self.gke_local.as_ref().is_some_and(|i| i.enabled)
  }

  pub fn rest_enabled(&self) -> bool {
    self.rest.as_ref().is_some_and(|i| i.enabled)
  }

  pub fn metrics_api_enabled(&self) -> bool {
    self.metrics_api.as_ref().is_some_and(|i| i.enabled)
  }

  pub fn any_enabled(&self) -> bool {
    self.gke_local_enabled() || self.rest_enabled() || self.metrics_api_enabled()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GkeLocalInputDef {
  #[serde(default)]
  pub enabled: bool,
  /// JSON dump of cluster objects. Defaults to the top level `dumpFile`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RestInputDef {
  #[serde(default)]
  pub enabled: bool,
  /// URL with an optional `CLUSTER_ID` placeholder.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetricsInputDef {
  #[serde(default)]
  pub enabled: bool,
  /// Prometheus server address, e.g. `http://prometheus:9090`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub password: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_queries: Option<usize>,
  #[serde(default)]
  pub metrics: Vec<MetricDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricDef {
  pub name: String,
  pub query: String,
}
