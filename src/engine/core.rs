// src/engine/core.rs

//! Synchronous decision-making half of the runtime.
//!
//! [`CoreRuntime`] turns a [`RuntimeEvent`] into a [`CoreStep`]: which tasks
//! to dispatch and whether to keep going. It never awaits and never touches
//! the filesystem; the completion probe runs before [`CoreRuntime::start`]
//! and its result is passed in. Tests drive it by hand.

use std::collections::HashSet;

use tracing::warn;

use crate::dag::Scheduler;
use crate::engine::event_handlers::{CoreStep, handle_task_completion, start_run_from_goals};
use crate::engine::{RunSummary, RuntimeEvent, TaskName};

#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    /// Begin the single run of this process.
    pub fn start(&mut self, goals: &[TaskName], completed: &HashSet<TaskName>) -> CoreStep {
        start_run_from_goals(&mut self.scheduler, goals, completed)
    }

    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskCompleted { task, outcome } => {
                handle_task_completion(&mut self.scheduler, task, outcome)
            }
            RuntimeEvent::ShutdownRequested => {
                warn!("shutdown requested; tasks still pending are reported as unfinished");
                CoreStep {
                    commands: Vec::new(),
                    keep_running: false,
                }
            }
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.scheduler.summary()
    }
}
