// src/exec/backend.rs

//! The seam between the runtime and whatever actually runs tasks.
//!
//! [`Runtime`](crate::engine::runtime::Runtime) only needs somewhere to
//! hand ready tasks. In production that is [`RealExecutorBackend`], which
//! forwards them to the worker loop in
//! [`executor_loop`](super::executor_loop). Tests plug in a backend that
//! answers with completion events directly, without touching processes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::errors::{Error, Result};
use crate::fs::FileSystem;

use super::executor_loop::{ExecutorHandle, spawn_executor};

/// Boxed future returned by [`ExecutorBackend::dispatch`].
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Accepts ready tasks from the runtime.
///
/// Each dispatched task must be answered with exactly one
/// `RuntimeEvent::TaskCompleted`, otherwise the run never drains.
pub trait ExecutorBackend: Send {
    fn dispatch(&mut self, tasks: Vec<ScheduledTask>) -> DispatchFuture<'_>;

    /// Called once the runtime stops. Work still in flight must be stopped
    /// before the returned future resolves.
    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }
}

/// Backend that feeds the bounded worker pool.
pub struct RealExecutorBackend {
    executor: ExecutorHandle,
}

impl RealExecutorBackend {
    /// Starts the worker loop with `workers` concurrent slots. Completion
    /// events are reported on `runtime_tx`.
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        fs: Arc<dyn FileSystem>,
        workers: usize,
    ) -> Self {
        Self {
            executor: spawn_executor(runtime_tx, fs, workers),
        }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn dispatch(&mut self, tasks: Vec<ScheduledTask>) -> DispatchFuture<'_> {
        let queue = self.executor.queue();
        Box::pin(async move {
            for task in tasks {
                queue.send(task).await.map_err(Error::from)?;
            }
            Ok(())
        })
    }

    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.executor.shutdown())
    }
}
