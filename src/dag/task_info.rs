// src/dag/task_info.rs

//! Task metadata and per-run state management.

use crate::engine::{TaskFailure, TaskName};
use crate::tasks::{TaskAction, TaskSpec, Target};

/// Per-run state of a task (internal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Needed by this run, waiting on requirements.
    Pending,
    /// Dispatched to the executor.
    Running,
    /// Output existed when the run started; never dispatched.
    AlreadyComplete,
    /// Action ran and succeeded.
    DoneSuccess,
    /// Action ran and failed.
    DoneFailed,
    /// Never dispatched because a requirement failed.
    Blocked,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunState::Pending | RunState::Running)
    }

    /// Whether dependents may proceed.
    pub fn satisfies_dependents(self) -> bool {
        matches!(self, RunState::AlreadyComplete | RunState::DoneSuccess)
    }
}

/// Public, read-only view of a task's per-run state.
///
/// This is exposed for tests and diagnostics without leaking the internal
/// `RunState` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Not needed by the current run.
    NotInRun,
    Pending,
    Running,
    AlreadyComplete,
    DoneSuccess,
    DoneFailed,
    Blocked,
}

impl From<Option<RunState>> for TaskRunState {
    fn from(state: Option<RunState>) -> Self {
        match state {
            None => TaskRunState::NotInRun,
            Some(RunState::Pending) => TaskRunState::Pending,
            Some(RunState::Running) => TaskRunState::Running,
            Some(RunState::AlreadyComplete) => TaskRunState::AlreadyComplete,
            Some(RunState::DoneSuccess) => TaskRunState::DoneSuccess,
            Some(RunState::DoneFailed) => TaskRunState::DoneFailed,
            Some(RunState::Blocked) => TaskRunState::Blocked,
        }
    }
}

/// Static task information derived from the plan, plus per-run state.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    /// Declaration order in the plan; ready tasks are dispatched in this order.
    pub order: usize,
    pub sample: Option<String>,
    pub output: Option<Target>,
    pub action: TaskAction,
    /// Direct requirements.
    pub deps: Vec<TaskName>,

    /// Per-run state (None if not participating in the current run).
    pub run_state: Option<RunState>,

    /// Reason for the most recent failure, if any.
    pub failure: Option<TaskFailure>,
}

impl TaskInfo {
    pub fn from_spec(spec: &TaskSpec, order: usize) -> Self {
        Self {
            name: spec.name.clone(),
            order,
            sample: spec.sample.clone(),
            output: spec.output.clone(),
            action: spec.action.clone(),
            deps: spec.requires.clone(),
            run_state: None,
            failure: None,
        }
    }
}

/// Description of a task that the scheduler wants the executor to run now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub name: TaskName,
    pub sample: Option<String>,
    pub output: Option<Target>,
    pub action: TaskAction,
}

impl ScheduledTask {
    pub fn from_task_info(info: &TaskInfo) -> Self {
        Self {
            name: info.name.clone(),
            sample: info.sample.clone(),
            output: info.output.clone(),
            action: info.action.clone(),
        }
    }
}
