// src/dag/scheduler_step.rs

//! What changed in the scheduler after one event.

use crate::dag::task_info::ScheduledTask;
use crate::engine::TaskName;

/// Delta produced by [`Scheduler::step_start`](super::Scheduler::step_start)
/// or [`Scheduler::step_completion`](super::Scheduler::step_completion).
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Ready for dispatch now.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// Tasks whose action failed in this step.
    pub newly_failed: Vec<TaskName>,
    /// Tasks that will never run because of a failure in this step.
    pub newly_blocked: Vec<TaskName>,
    /// The run had active work before this step and has none after it.
    pub run_just_finished: bool,
}
