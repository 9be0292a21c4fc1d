// src/engine/mod.rs

//! Runs a task plan to completion.
//!
//! Executors and the Ctrl-C handler send [`RuntimeEvent`]s; [`core`] decides
//! what happens next and [`runtime`] carries it out. The outcome of a run
//! is a [`RunSummary`].

use std::fmt;
use std::path::PathBuf;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Why a task did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    /// An externally supplied input file is absent.
    MissingInput(PathBuf),
    /// The QC program exited unsuccessfully (-1 when killed by a signal).
    ExitCode(i32),
    /// The action reported success but its output target does not exist.
    OutputMissing(PathBuf),
    /// Spawning, reading or writing failed.
    Io(String),
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFailure::MissingInput(p) => write!(f, "missing input {}", p.display()),
            TaskFailure::ExitCode(code) => write!(f, "exit code {code}"),
            TaskFailure::OutputMissing(p) => {
                write!(f, "finished without producing {}", p.display())
            }
            TaskFailure::Io(msg) => write!(f, "{msg}"),
        }
    }
}

/// Outcome of a task action for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(TaskFailure),
}

/// Events flowing into the runtime from the executor and signal handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task action finished with a concrete outcome.
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;
pub mod summary;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
pub use summary::RunSummary;
