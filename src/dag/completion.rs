// src/dag/completion.rs

use std::collections::HashSet;

use tracing::debug;

use crate::engine::TaskName;
use crate::fs::FileSystem;
use crate::tasks::TaskPlan;

/// Names of the plan's tasks whose output target already exists.
///
/// This is the only place the scheduler's view of completion touches the
/// filesystem; the scheduler itself stays pure.
pub fn completed_tasks(plan: &TaskPlan, fs: &dyn FileSystem) -> HashSet<TaskName> {
    plan.tasks()
        .iter()
        .filter(|task| match &task.output {
            Some(target) => {
                let exists = target.exists(fs);
                if exists {
                    debug!(task = %task.name, target = %target, "target exists");
                }
                exists
            }
            None => false,
        })
        .map(|task| task.name.clone())
        .collect()
}
