use serde::{Deserialize, Serialize};

/// A cluster to audit.
///
/// Either `id` is set (a fully qualified cluster id) or all of `name`,
/// `project` and `location` are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterDef {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub project: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
}

impl ClusterDef {
  pub fn from_id(id: impl Into<String>) -> Self {
    Self {
      id: Some(id.into()),
      ..Default::default()
    }
  }

  pub fn from_parts(
    name: impl Into<String>,
    project: impl Into<String>,
    location: impl Into<String>,
  ) -> Self {
    Self {
      id: None,
      name: Some(name.into()),
      project: Some(project.into()),
      location: Some(location.into()),
    }
  }

  /// The cluster id, rendered from the parts when no explicit id is set.
  ///
  /// Returns `None` for a definition that is neither.
  pub fn cluster_id(&self) -> Option<String> {
    if let Some(id) = &self.id {
      return Some(id.clone());
    }
    match (&self.project, &self.location, &self.name) {
      (Some(project), Some(location), Some(name)) => Some(format!(
        "projects/{}/locations/{}/clusters/{}",
        project, location, name
      )),
      _ => None,
    }
  }

  pub(crate) fn has_parts(&self) -> bool {
    self.name.is_some() || self.project.is_some() || self.location.is_some()
  }

  pub(crate) fn has_all_parts(&self) -> bool {
    [&self.name, &self.project, &self.location]
      .iter()
      .all(|p| p.as_deref().is_some_and(|s| !s.is_empty()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cluster_id_explicit() {
    let cluster = ClusterDef::from_id("projects/p/zones/z/clusters/c");
    assert_eq!(
      cluster.cluster_id().as_deref(),
      Some("projects/p/zones/z/clusters/c")
    );
  }

  #[test]
  fn test_cluster_id_from_parts() {
    let cluster = ClusterDef::from_parts("prod", "demo", "europe-west2");
    assert_eq!(
      cluster.cluster_id().as_deref(),
      Some("projects/demo/locations/europe-west2/clusters/prod")
    );
  }

  #[test]
  fn test_cluster_id_incomplete() {
    let cluster = ClusterDef {
      name: Some("prod".to_string()),
      ..Default::default()
    };
    assert_eq!(cluster.cluster_id(), None);
    assert!(cluster.has_parts());
    assert!(!cluster.has_all_parts());
  }
}
