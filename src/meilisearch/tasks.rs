use std::time::Duration;
use tracing::{error, info};

use super::{SearchEngine, SpawnedTask};

/// Poll a spawned task until it reaches a terminal state.
///
/// Only a task whose initial status is literally `"enqueued"` is polled;
/// any other initial status skips the loop and is reported as success.
/// That asymmetry is inherited from the original service and kept for
/// behavioral parity.
///
/// Inside the loop: a non-empty error payload or a `failed` status stops
/// with failure, `succeeded` stops with success, anything else sleeps
/// `interval` and retries. A transport error while fetching the task aborts
/// immediately. With `max_attempts` unset the loop is unbounded, matching
/// the original; setting it caps the number of fetches.
pub async fn wait_for_task(
    search: &dyn SearchEngine,
    spawned: &SpawnedTask,
    interval: Duration,
    max_attempts: Option<u32>,
) -> bool {
    info!(
        "waiting for task {} (initial status: {})",
        spawned.task_uid, spawned.status
    );

    if spawned.status != "enqueued" {
        return true;
    }

    let mut attempts: u32 = 0;
    loop {
        if let Some(max) = max_attempts {
            if attempts >= max {
                error!(
                    "task {} still not terminal after {max} polls, giving up",
                    spawned.task_uid
                );
                return false;
            }
        }
        attempts += 1;

        let task = match search.get_task(spawned.task_uid).await {
            Ok(task) => task,
            Err(e) => {
                error!("failed to fetch status of task {}: {e}", spawned.task_uid);
                return false;
            }
        };

        if let Some(err) = &task.error {
            error!("task {} reported an error: {}", spawned.task_uid, err.message);
            return false;
        }

        match task.status.as_str() {
            "succeeded" => {
                info!("task {} succeeded", spawned.task_uid);
                return true;
            }
            "failed" => {
                error!("task {} failed", spawned.task_uid);
                return false;
            }
            status => {
                info!("task {} status: {status}, waiting...", spawned.task_uid);
                tokio::time::sleep(interval).await;
            }
        }
    }
}
