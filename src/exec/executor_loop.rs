// src/exec/executor_loop.rs

//! Main executor loop that runs scheduled task actions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskName};
use crate::exec::task_runner::run_task;
use crate::fs::FileSystem;

type ActiveTasks = Arc<Mutex<HashMap<TaskName, JoinHandle<()>>>>;

/// Handle on a running executor loop.
///
/// Dropping it closes the queue; in-flight actions keep running until
/// [`ExecutorHandle::shutdown`] aborts them.
#[derive(Debug)]
pub struct ExecutorHandle {
    queue: mpsc::Sender<ScheduledTask>,
    receiver: JoinHandle<()>,
    active: ActiveTasks,
}

impl ExecutorHandle {
    pub fn queue(&self) -> mpsc::Sender<ScheduledTask> {
        self.queue.clone()
    }

    /// Stop accepting tasks and abort every action still in flight.
    ///
    /// Returns after each aborted action has been dropped, so any child
    /// process it owned has been sent a kill signal.
    pub async fn shutdown(&mut self) {
        self.receiver.abort();

        let handles: Vec<(TaskName, JoinHandle<()>)> = match self.active.lock() {
            Ok(mut active) => active.drain().collect(),
            Err(poisoned) => poisoned.into_inner().drain().collect(),
        };

        for (name, handle) in handles {
            if handle.is_finished() {
                continue;
            }
            warn!(task = %name, "aborting unfinished task");
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(task = %name, error = %e, "task action panicked");
                }
            }
        }
    }
}

/// Spawn the background executor loop.
///
/// Each task runs in its own Tokio task, holding one of `workers` permits
/// while its action executes, so at most `workers` actions run
/// concurrently. Permits are granted in dispatch order.
///
/// Per task name there is never more than one action in flight; a duplicate
/// dispatch while the first is still running is ignored.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    fs: Arc<dyn FileSystem>,
    workers: usize,
) -> ExecutorHandle {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let active: ActiveTasks = Arc::new(Mutex::new(HashMap::new()));
    let registry = Arc::clone(&active);

    let receiver = tokio::spawn(async move {
        info!(workers, "executor loop started");

        while let Some(task) = rx.recv().await {
            let Ok(mut active) = registry.lock() else {
                warn!("task registry poisoned; executor loop stopping");
                break;
            };
            active.retain(|_, handle| !handle.is_finished());

            if active.contains_key(&task.name) {
                warn!(task = %task.name, "task already running; ignoring duplicate dispatch");
                continue;
            }

            let name = task.name.clone();
            let handle = tokio::spawn(run_with_permit(
                task,
                Arc::clone(&fs),
                runtime_tx.clone(),
                Arc::clone(&permits),
            ));
            active.insert(name, handle);
        }

        info!("executor loop finished (channel closed)");
    });

    ExecutorHandle {
        queue: tx,
        receiver,
        active,
    }
}

async fn run_with_permit(
    task: ScheduledTask,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    permits: Arc<Semaphore>,
) {
    let name = task.name.clone();

    // The semaphore is never closed, so acquisition only fails on shutdown.
    let Ok(_permit) = permits.acquire_owned().await else {
        debug!(task = %name, "worker pool closed; not running task");
        return;
    };

    debug!(task = %name, "worker acquired");
    run_task(task, fs, runtime_tx).await;
    debug!(task = %name, "task runner future finished");
}
