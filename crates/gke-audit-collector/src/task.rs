//! Task queue construction.

use std::sync::Arc;

use gke_audit_input::{InputError, SharedInput};
use tokio::sync::{Mutex, mpsc};

/// One unit of work: fetch one input's data for one cluster.
pub(crate) struct Task {
  pub input: SharedInput,
  pub cluster_id: String,
}

/// Result of a task, tagged with where it came from.
#[derive(Debug)]
pub(crate) struct Outcome<T> {
  pub cluster_id: String,
  pub input_id: String,
  pub payload: T,
}

/// A successful fetch.
pub(crate) type Success = Outcome<serde_json::Value>;

/// A failed fetch.
pub(crate) type Failure = Outcome<InputError>;

/// Queue shared by all workers. Workers take turns receiving from it.
pub(crate) type TaskQueue = Arc<Mutex<mpsc::UnboundedReceiver<Task>>>;

/// Build a sealed queue holding one task per (input, cluster) pair.
///
/// Inputs are the outer loop, clusters the inner one. The sender is dropped
/// before returning, so workers see the end of the queue once it is drained.
pub(crate) fn build_task_queue(inputs: &[SharedInput], cluster_ids: &[String]) -> (TaskQueue, usize) {
  let (sender, receiver) = mpsc::unbounded_channel();
  let mut count = 0;

  for input in inputs {
    for cluster_id in cluster_ids {
      // The receiver is alive in this scope, so sending cannot fail.
      let _ = sender.send(Task {
        input: input.clone(),
        cluster_id: cluster_id.clone(),
      });
      count += 1;
    }
  }

  (Arc::new(Mutex::new(receiver)), count)
}
