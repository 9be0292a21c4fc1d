// src/engine/runtime.rs

use std::collections::HashSet;
use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::ExecutorBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, CoreStep, RunSummary, RuntimeEvent, TaskName};

/// Async shell around [`CoreRuntime`].
///
/// Pulls events off `event_rx`, lets the core decide, and carries out the
/// resulting commands against the executor backend. It holds no scheduling
/// logic of its own.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Drive one run towards `goals` and return its summary.
    ///
    /// Returns once the core stops (every needed task terminal, or a
    /// shutdown request) or the event channel closes. Anything the executor
    /// still has in flight is stopped before the summary is returned.
    pub async fn run(
        mut self,
        goals: &[TaskName],
        completed: &HashSet<TaskName>,
    ) -> Result<RunSummary> {
        info!(?goals, already_complete = completed.len(), "run started");

        let driven = self.drive(goals, completed).await;
        self.executor.shutdown().await;
        driven?;

        info!("run stopped");
        Ok(self.core.summary())
    }

    async fn drive(&mut self, goals: &[TaskName], completed: &HashSet<TaskName>) -> Result<()> {
        let step = self.core.start(goals, completed);
        let mut keep_running = self.apply(step).await?;

        while keep_running {
            let Some(event) = self.event_rx.recv().await else {
                warn!("event channel closed before the run finished");
                break;
            };
            debug!(?event, "runtime event");
            let step = self.core.step(event);
            keep_running = self.apply(step).await?;
        }
        Ok(())
    }

    async fn apply(&mut self, step: CoreStep) -> Result<bool> {
        for command in step.commands {
            match command {
                CoreCommand::DispatchTasks(tasks) => {
                    debug!(
                        tasks = ?tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                        "dispatching"
                    );
                    self.executor.dispatch(tasks).await?;
                }
                CoreCommand::RequestExit => debug!("core requested exit"),
            }
        }
        Ok(step.keep_running)
    }
}
