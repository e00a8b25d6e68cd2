//! Worker loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use gke_audit_input::InputError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::task::{Failure, Outcome, Success, Task, TaskQueue};

/// Where a worker sends its outcomes.
pub(crate) struct WorkerChannels {
  pub successes: mpsc::UnboundedSender<Success>,
  pub failures: mpsc::UnboundedSender<Failure>,
}

/// Drain the task queue until it is closed and empty.
///
/// Every task pulled from the queue produces exactly one outcome. Once
/// `cancel` fires, remaining tasks are not fetched and are reported as
/// [`InputError::Cancelled`] instead.
pub(crate) async fn run_worker(
  worker_id: usize,
  queue: TaskQueue,
  channels: WorkerChannels,
  cancel: CancellationToken,
) {
  debug!(worker_id, "worker started");

  loop {
    let task = queue.lock().await.recv().await;
    let Some(task) = task else {
      break;
    };
    let input_id = task.input.id().to_string();

    if cancel.is_cancelled() {
      debug!(
        worker_id,
        input_id = %input_id,
        cluster_id = %task.cluster_id,
        "collection cancelled, skipping fetch"
      );
      send_failure(&channels, task.cluster_id, input_id, InputError::Cancelled);
      continue;
    }

    debug!(
      worker_id,
      input_id = %input_id,
      cluster_id = %task.cluster_id,
      "fetching input data"
    );

    match fetch(&task).await {
      Ok(value) => {
        debug!(worker_id, input_id = %input_id, cluster_id = %task.cluster_id, "fetch succeeded");
        // Receivers live until every worker has exited.
        let _ = channels.successes.send(Outcome {
          cluster_id: task.cluster_id,
          input_id,
          payload: value,
        });
      }
      Err(error) => {
        debug!(
          worker_id,
          input_id = %input_id,
          cluster_id = %task.cluster_id,
          error = %error,
          "fetch failed"
        );
        send_failure(&channels, task.cluster_id, input_id, error);
      }
    }
  }

  debug!(worker_id, "worker done");
}

fn send_failure(channels: &WorkerChannels, cluster_id: String, input_id: String, error: InputError) {
  let _ = channels.failures.send(Outcome {
    cluster_id,
    input_id,
    payload: error,
  });
}

/// Call the input, turning a panic into an error for this task only.
async fn fetch(task: &Task) -> Result<serde_json::Value, InputError> {
  // Panics raised while creating the future are caught as well.
  match AssertUnwindSafe(async { task.input.get_data(&task.cluster_id).await })
    .catch_unwind()
    .await
  {
    Ok(result) => result,
    Err(panic) => Err(InputError::Panicked {
      message: panic_message(panic.as_ref()),
    }),
  }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
  if let Some(message) = panic.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = panic.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic payload".to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::task::build_task_queue;
  use crate::testing::MockInput;
  use serde_json::json;

  struct Received {
    successes: Vec<Success>,
    failures: Vec<Failure>,
  }

  async fn run_single_worker(
    queue: TaskQueue,
    cancel: CancellationToken,
  ) -> Received {
    let (success_tx, mut success_rx) = mpsc::unbounded_channel();
    let (failure_tx, mut failure_rx) = mpsc::unbounded_channel();
    let channels = WorkerChannels {
      successes: success_tx,
      failures: failure_tx,
    };

    // Runs to completion; the channels close when the worker drops them.
    run_worker(0, queue, channels, cancel).await;

    let mut received = Received {
      successes: Vec::new(),
      failures: Vec::new(),
    };
    while let Some(outcome) = success_rx.recv().await {
      received.successes.push(outcome);
    }
    while let Some(outcome) = failure_rx.recv().await {
      received.failures.push(outcome);
    }
    received
  }

  #[tokio::test]
  async fn test_worker_routes_success_and_failure() {
    let (sender, receiver) = mpsc::unbounded_channel();
    sender
      .send(Task {
        input: MockInput::new("gke-api", |_| Err(InputError::fetch("test error"))),
        cluster_id: "cluster-one".to_string(),
      })
      .unwrap();
    sender
      .send(Task {
        input: MockInput::ok("gke-api", json!("test data 123")),
        cluster_id: "cluster-two".to_string(),
      })
      .unwrap();
    drop(sender);
    let queue = std::sync::Arc::new(tokio::sync::Mutex::new(receiver));

    let received = run_single_worker(queue, CancellationToken::new()).await;

    assert_eq!(received.successes.len(), 1);
    assert_eq!(received.failures.len(), 1);

    let success = &received.successes[0];
    assert_eq!(success.cluster_id, "cluster-two");
    assert_eq!(success.input_id, "gke-api");
    assert_eq!(success.payload, json!("test data 123"));

    let failure = &received.failures[0];
    assert_eq!(failure.cluster_id, "cluster-one");
    assert_eq!(failure.payload.to_string(), "fetch failed: test error");
  }

  #[tokio::test]
  async fn test_worker_isolates_panics() {
    let inputs = vec![
      MockInput::new("panicky", |cluster_id| {
        if cluster_id == "bad" {
          panic!("boom");
        }
        Ok(json!(cluster_id))
      }),
    ];
    let clusters = vec!["bad".to_string(), "good".to_string()];
    let (queue, _) = build_task_queue(&inputs, &clusters);

    let received = run_single_worker(queue, CancellationToken::new()).await;

    assert_eq!(received.successes.len(), 1);
    assert_eq!(received.successes[0].cluster_id, "good");
    assert_eq!(received.failures.len(), 1);
    match &received.failures[0].payload {
      InputError::Panicked { message } => assert_eq!(message, "boom"),
      other => panic!("expected panic error, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_worker_reports_cancelled_tasks() {
    let inputs = vec![MockInput::ok("a", json!(1)), MockInput::ok("b", json!(2))];
    let clusters = vec!["one".to_string(), "two".to_string()];
    let (queue, count) = build_task_queue(&inputs, &clusters);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let received = run_single_worker(queue, cancel).await;

    assert!(received.successes.is_empty());
    assert_eq!(received.failures.len(), count);
    assert!(
      received
        .failures
        .iter()
        .all(|f| matches!(f.payload, InputError::Cancelled))
    );
  }

  #[test]
  fn test_panic_message_payloads() {
    let static_str: Box<dyn Any + Send> = Box::new("static");
    assert_eq!(panic_message(static_str.as_ref()), "static");

    let owned: Box<dyn Any + Send> = Box::new(format!("owned {}", 1));
    assert_eq!(panic_message(owned.as_ref()), "owned 1");

    let other: Box<dyn Any + Send> = Box::new(42u32);
    assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
  }
}
