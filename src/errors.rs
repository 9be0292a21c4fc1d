// src/errors.rs

//! Errors raised while loading a config or building the task plan.
//!
//! Failures of individual tasks are not errors in this sense; they are
//! reported as [`TaskFailure`](crate::engine::TaskFailure) values in the run
//! summary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadQcError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A `[samples]` value that is neither a `"fwd:rev"` string nor a
    /// two-element fragment list.
    #[error("Invalid read spec for sample '{sample}': {reason}")]
    InvalidReadSpec { sample: String, reason: String },

    /// `--sample` named something absent from `[samples]`.
    #[error("Unknown sample: {0}")]
    UnknownSample(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ReadQcError>;
