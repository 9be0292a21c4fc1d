// src/tasks/mod.rs

//! Task descriptors for the QC stage.
//!
//! - [`target`]: file outputs whose existence marks completion.
//! - [`external`]: inputs supplied from outside the pipeline.
//! - [`concat`]: merging raw fragment files per read direction.
//! - [`paired_qc`]: the FaQCs invocation and its [`RunSpec`].
//! - [`fan_out`]: expands the sample mapping into a [`TaskPlan`].
//! - [`plan`]: the ordered, validated list of task descriptors.

use std::path::PathBuf;

use crate::engine::TaskName;

pub mod concat;
pub mod external;
pub mod fan_out;
pub mod paired_qc;
pub mod plan;
pub mod target;

pub use concat::ConcatFragments;
pub use external::ExternalFileCheck;
pub use fan_out::{AllSamplesQcWrapper, FanOut, PrepareFailure, WRAPPER_TASK};
pub use paired_qc::{PairedSampleQcTask, RunSpec};
pub use plan::TaskPlan;
pub use target::Target;

/// What a task does once its requirements are met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Succeed iff the task's output already exists.
    CheckExists,
    /// Byte-concatenate `sources` in order into the task's output.
    Concatenate { sources: Vec<PathBuf> },
    /// Invoke the QC program.
    RunQc(RunSpec),
    /// Nothing to run; complete once all requirements are.
    Aggregate,
}

impl TaskAction {
    pub fn kind(&self) -> &'static str {
        match self {
            TaskAction::CheckExists => "check",
            TaskAction::Concatenate { .. } => "concat",
            TaskAction::RunQc(_) => "qc",
            TaskAction::Aggregate => "wrapper",
        }
    }
}

/// A node of the task graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: TaskName,
    /// Owning sample, if the task belongs to one.
    pub sample: Option<String>,
    /// Tasks that must complete before this one runs.
    pub requires: Vec<TaskName>,
    /// Output whose existence marks this task complete. `None` for wrappers.
    pub output: Option<Target>,
    pub action: TaskAction,
}
