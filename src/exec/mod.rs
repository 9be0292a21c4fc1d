// src/exec/mod.rs

//! Task execution layer.
//!
//! This module actually performs the task actions (input checks, fragment
//! concatenation, QC program invocation via `tokio::process::Command`) and
//! reports back to the orchestration runtime via `RuntimeEvent`s.
//!
//! - [`executor_loop`] owns the loop that bounds concurrent actions.
//! - [`task_runner`] performs a single task action.
//! - [`backend`] is where the runtime hands off ready tasks.

pub mod backend;
pub mod executor_loop;
pub mod task_runner;

pub use backend::{DispatchFuture, ExecutorBackend, RealExecutorBackend};
pub use executor_loop::{ExecutorHandle, spawn_executor};
