//! Collection result types.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::AttributedError;

/// All data collected for a single cluster, keyed by input id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterData {
  /// Cluster identifier as it was passed to the collector.
  pub name: String,
  /// Input id -> value returned by that input, ordered by input id.
  pub data: BTreeMap<String, serde_json::Value>,
}

impl ClusterData {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      data: BTreeMap::new(),
    }
  }
}

/// Outcome of a complete collection.
///
/// A cluster shows up in `clusters` only if at least one input succeeded for
/// it. The same cluster can also appear in `errors` for the inputs that
/// failed.
#[derive(Debug, Default)]
pub struct CollectionResult {
  /// Per-cluster data, keyed by cluster id.
  pub clusters: HashMap<String, ClusterData>,
  /// One entry per failed fetch, in completion order.
  pub errors: Vec<AttributedError>,
}

impl CollectionResult {
  /// Whether every fetch succeeded.
  pub fn is_complete(&self) -> bool {
    self.errors.is_empty()
  }

  /// Number of successful fetches across all clusters.
  pub fn success_count(&self) -> usize {
    self.clusters.values().map(|c| c.data.len()).sum()
  }
}
