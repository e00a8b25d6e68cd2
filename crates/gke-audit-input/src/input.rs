use std::sync::Arc;

use async_trait::async_trait;

use crate::error::InputError;

/// A source of per-cluster data.
///
/// The collector calls [`Input::get_data`] concurrently for different
/// clusters on the same instance, so implementations must be `Send + Sync`
/// and must not assume calls are serialized. It never calls `get_data`
/// twice for the same cluster within one collection.
///
/// [`Input::id`] is used as the key under which the returned value is stored
/// in the cluster's data bag. It must be stable and unique among the inputs
/// registered for one collection; two inputs sharing an id overwrite each
/// other's values.
#[async_trait]
pub trait Input: Send + Sync {
  /// Stable identifier, used as the aggregation key.
  fn id(&self) -> &str;

  /// Human readable description.
  fn description(&self) -> &str;

  /// Fetch this input's data for the given cluster.
  async fn get_data(&self, cluster_id: &str) -> Result<serde_json::Value, InputError>;

  /// Release any resources held by the input.
  ///
  /// Called by the owner of the input once it is done collecting, never by
  /// the collector itself.
  async fn close(&self) -> Result<(), InputError>;
}

/// Inputs are shared between concurrently running workers.
pub type SharedInput = Arc<dyn Input>;
