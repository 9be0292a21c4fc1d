// src/engine/event_handlers.rs

//! Turns scheduler deltas into commands for the async shell.

use std::collections::HashSet;

use tracing::info;

use crate::dag::{ScheduledTask, Scheduler};
use crate::engine::{TaskName, TaskOutcome};

/// Something the async shell must do on the core's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// Nothing is left in flight; stop reading events.
    RequestExit,
}

/// Output of one core transition.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    pub keep_running: bool,
}

impl CoreStep {
    fn from_ready(scheduler: &Scheduler, newly_ready: Vec<ScheduledTask>) -> Self {
        let mut commands = Vec::new();
        if !newly_ready.is_empty() {
            commands.push(CoreCommand::DispatchTasks(newly_ready));
        }

        let keep_running = !scheduler.is_idle();
        if !keep_running {
            commands.push(CoreCommand::RequestExit);
        }
        Self {
            commands,
            keep_running,
        }
    }
}

/// Start the run towards `goals` and dispatch everything ready right away.
///
/// When every goal is already complete the run finishes immediately and the
/// step asks the shell to exit without dispatching anything.
pub fn start_run_from_goals(
    scheduler: &mut Scheduler,
    goals: &[TaskName],
    completed: &HashSet<TaskName>,
) -> CoreStep {
    let newly_ready = scheduler.start_run(goals, completed);
    if scheduler.is_idle() {
        info!("nothing to do; every goal is already complete");
    }
    CoreStep::from_ready(scheduler, newly_ready)
}

pub fn handle_task_completion(
    scheduler: &mut Scheduler,
    task: TaskName,
    outcome: TaskOutcome,
) -> CoreStep {
    let newly_ready = scheduler.handle_completion(&task, outcome);
    CoreStep::from_ready(scheduler, newly_ready)
}
