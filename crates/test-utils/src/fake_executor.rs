use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use readqc::dag::ScheduledTask;
use readqc::engine::{RuntimeEvent, TaskFailure, TaskOutcome};
use readqc::exec::{DispatchFuture, ExecutorBackend};
use readqc::fs::mock::MockFileSystem;
use tokio::sync::mpsc;

/// A fake executor that:
/// - records which tasks were "run", in dispatch order
/// - immediately reports `TaskCompleted` for each scheduled task
///   (`Success` unless a failure was configured for that task)
/// - optionally writes each successful task's target into a
///   [`MockFileSystem`], so reruns observe completed outputs.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<String>>>,
    failures: HashMap<String, TaskFailure>,
    fs: Option<MockFileSystem>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            failures: HashMap::new(),
            fs: None,
        }
    }

    /// Report `failure` whenever `task` is dispatched.
    pub fn failing(mut self, task: &str, failure: TaskFailure) -> Self {
        self.failures.insert(task.to_string(), failure);
        self
    }

    /// Materialise targets of successful tasks in `fs`.
    pub fn writing_outputs_to(mut self, fs: MockFileSystem) -> Self {
        self.fs = Some(fs);
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn dispatch(&mut self, tasks: Vec<ScheduledTask>) -> DispatchFuture<'_> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let failures = self.failures.clone();
        let fs = self.fs.clone();

        Box::pin(async move {
            for t in tasks {
                {
                    let mut guard = executed.lock().unwrap();
                    guard.push(t.name.clone());
                }

                let outcome = match failures.get(&t.name) {
                    Some(failure) => TaskOutcome::Failed(failure.clone()),
                    None => {
                        if let (Some(fs), Some(target)) = (&fs, &t.output) {
                            fs.add_file(target.path(), format!("{}\n", t.name));
                        }
                        TaskOutcome::Success
                    }
                };

                tx.send(RuntimeEvent::TaskCompleted {
                    task: t.name.clone(),
                    outcome,
                })
                .await
                .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
