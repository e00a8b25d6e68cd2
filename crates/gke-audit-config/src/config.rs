use std::path::Path;

use gke_audit_collector::{CollectorConfig, DEFAULT_MAX_WORKERS};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cluster::ClusterDef;
use crate::error::ConfigError;
use crate::inputs::{GkeLocalInputDef, InputsDef};

/// Top level gke-audit configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
  #[serde(default)]
  pub clusters: Vec<ClusterDef>,
  /// Local JSON dump of cluster objects. When set, the cluster list comes
  /// from the dump instead of `clusters`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dump_file: Option<String>,
  #[serde(default)]
  pub inputs: InputsDef,
  #[serde(default)]
  pub collector: CollectorSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CollectorSettings {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_workers: Option<usize>,
}

impl CollectorSettings {
  pub fn to_collector_config(&self) -> CollectorConfig {
    CollectorConfig {
      max_workers: self.max_workers.unwrap_or(DEFAULT_MAX_WORKERS),
    }
  }
}

impl Config {
  /// Read and parse a JSON config file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading config");
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }

  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(json)?)
  }

  /// Fill in unset values.
  pub fn apply_defaults(&mut self) {
    self.collector.max_workers.get_or_insert(DEFAULT_MAX_WORKERS);

    if let Some(dump_file) = &self.dump_file {
      let gke_local = self
        .inputs
        .gke_local
        .get_or_insert_with(GkeLocalInputDef::default);
      if gke_local.file.is_none() {
        gke_local.file = Some(dump_file.clone());
      }
    }
  }

  /// Check the configuration, returning the first problem found.
  ///
  /// Every problem is logged at `warn` level.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let problems = self.problems();
    for problem in &problems {
      warn!(problem = %problem, "invalid configuration");
    }
    match problems.into_iter().next() {
      Some(first) => Err(ConfigError::invalid(first)),
      None => Ok(()),
    }
  }

  fn problems(&self) -> Vec<String> {
    let mut problems = Vec::new();

    if self.clusters.is_empty() && self.dump_file.is_none() {
      problems.push("there are no clusters defined".to_string());
    }
    for (i, cluster) in self.clusters.iter().enumerate() {
      match &cluster.id {
        Some(_) if cluster.has_parts() => problems.push(format!(
          "cluster [{}]: id is set together with name, project or location",
          i
        )),
        None if !cluster.has_all_parts() => problems.push(format!(
          "cluster [{}]: name, project and location are required when id is not set",
          i
        )),
        Some(id) if id.is_empty() => problems.push(format!("cluster [{}]: id is empty", i)),
        _ => {}
      }
    }

    let inputs = &self.inputs;
    if !inputs.any_enabled() {
      problems.push("there are no inputs enabled".to_string());
    }
    if let Some(gke_local) = inputs.gke_local.as_ref().filter(|i| i.enabled) {
      if gke_local.file.as_deref().is_none_or(str::is_empty) {
        problems.push("gkeLocal input is enabled but has no file".to_string());
      }
    }
    if let Some(rest) = inputs.rest.as_ref().filter(|i| i.enabled) {
      if rest.endpoint.as_deref().is_none_or(str::is_empty) {
        problems.push("rest input is enabled but has no endpoint".to_string());
      }
    }
    if let Some(metrics) = inputs.metrics_api.as_ref().filter(|i| i.enabled) {
      if metrics.address.as_deref().is_none_or(str::is_empty) {
        problems.push("metricsAPI input is enabled but has no address".to_string());
      }
      match (&metrics.username, &metrics.password) {
        (Some(_), None) => problems.push("metricsAPI username is set without a password".to_string()),
        (None, Some(_)) => problems.push("metricsAPI password is set without a username".to_string()),
        _ => {}
      }
    }

    if self.collector.max_workers == Some(0) {
      problems.push("collector maxWorkers must be greater than zero".to_string());
    }

    problems
  }
}
