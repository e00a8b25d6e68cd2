use std::fmt;

use crate::error::InputError;

/// A parsed GKE cluster identifier.
///
/// Accepts `projects/<project>/locations/<location>/clusters/<name>` and the
/// older `projects/<project>/zones/<zone>/clusters/<name>` form. Anything
/// before the `projects/` segment (e.g. a self link host) is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterId {
  pub project: String,
  pub location: String,
  pub name: String,
}

impl ClusterId {
  /// Parse a fully qualified cluster identifier.
  pub fn parse(id: &str) -> Result<Self, InputError> {
    let invalid = |message: &str| InputError::InvalidClusterId {
      cluster_id: id.to_string(),
      message: message.to_string(),
    };

    let start = id
      .find("projects/")
      .ok_or_else(|| invalid("missing 'projects/' segment"))?;
    let parts: Vec<&str> = id[start..].split('/').collect();

    match parts.as_slice() {
      ["projects", project, "locations" | "zones", location, "clusters", name]
        if !project.is_empty() && !location.is_empty() && !name.is_empty() =>
      {
        Ok(Self {
          project: project.to_string(),
          location: location.to_string(),
          name: name.to_string(),
        })
      }
      _ => Err(invalid(
        "expected projects/<project>/locations/<location>/clusters/<name>",
      )),
    }
  }
}

impl fmt::Display for ClusterId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "projects/{}/locations/{}/clusters/{}",
      self.project, self.location, self.name
    )
  }
}
