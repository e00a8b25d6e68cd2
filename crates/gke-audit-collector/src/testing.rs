//! Test inputs shared by the unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use gke_audit_input::{Input, InputError, SharedInput};

type Handler = Box<dyn Fn(&str) -> Result<serde_json::Value, InputError> + Send + Sync>;

pub(crate) struct MockInput {
  id: String,
  handler: Handler,
}

impl MockInput {
  pub fn new(
    id: &str,
    handler: impl Fn(&str) -> Result<serde_json::Value, InputError> + Send + Sync + 'static,
  ) -> SharedInput {
    Arc::new(Self {
      id: id.to_string(),
      handler: Box::new(handler),
    })
  }

  pub fn ok(id: &str, value: serde_json::Value) -> SharedInput {
    Self::new(id, move |_| Ok(value.clone()))
  }

  pub fn failing(id: &str, message: &'static str) -> SharedInput {
    Self::new(id, move |_| Err(InputError::fetch(message)))
  }
}

#[async_trait]
impl Input for MockInput {
  fn id(&self) -> &str {
    &self.id
  }

  fn description(&self) -> &str {
    "mock input"
  }

  async fn get_data(&self, cluster_id: &str) -> Result<serde_json::Value, InputError> {
    (self.handler)(cluster_id)
  }

  async fn close(&self) -> Result<(), InputError> {
    Ok(())
  }
}
