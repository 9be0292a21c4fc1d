// src/dag/state_manager.rs

//! Per-run state management for tasks in the scheduler.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::dag::DagGraph;
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo};
use crate::engine::TaskName;

/// Manages per-run state transitions for tasks.
pub struct StateManager<'a> {
    graph: &'a DagGraph,
    tasks: &'a mut HashMap<TaskName, TaskInfo>,
}

impl<'a> StateManager<'a> {
    pub fn new(graph: &'a DagGraph, tasks: &'a mut HashMap<TaskName, TaskInfo>) -> Self {
        Self { graph, tasks }
    }

    /// Walk requirements depth-first from `goals`, deciding which tasks this
    /// run needs.
    ///
    /// - A task with an output listed in `completed` is marked
    ///   `AlreadyComplete` and its requirements are not visited.
    /// - Every other reached task is marked `Pending` and its requirements
    ///   are visited.
    /// - Unreached tasks stay out of the run.
    pub fn mark_needed_from_goals(&mut self, goals: &[TaskName], completed: &HashSet<TaskName>) {
        let mut stack: Vec<TaskName> = goals.iter().rev().cloned().collect();
        let mut visited: HashSet<TaskName> = HashSet::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }

            let Some(info) = self.tasks.get_mut(&name) else {
                warn!(task = %name, "node in DAG not present in tasks map");
                continue;
            };

            if info.output.is_some() && completed.contains(&name) {
                info.run_state = Some(RunState::AlreadyComplete);
                debug!(task = %info.name, "output already exists; not running");
                continue;
            }

            info.run_state = Some(RunState::Pending);
            debug!(task = %info.name, "marked Pending for this run");

            for dep in self.graph.dependencies_of(&name).iter().rev() {
                stack.push(dep.clone());
            }
        }
    }

    /// Determine whether all requirements of the given task are satisfied.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        let ro = ReadOnlyStateManager::new(self.tasks);
        ro.deps_satisfied_for_info(info)
    }

    /// Mark every pending task downstream of `failed_task` as `Blocked`.
    ///
    /// Returns the newly blocked tasks (excluding `failed_task` itself).
    pub fn mark_dependents_blocked(&mut self, failed_task: &str) -> Vec<TaskName> {
        let mut stack: Vec<TaskName> = self.graph.dependents_of(failed_task).to_vec();
        let mut newly_blocked = Vec::new();

        while let Some(name) = stack.pop() {
            if let Some(info) = self.tasks.get_mut(&name) {
                if info.run_state == Some(RunState::Pending) {
                    info.run_state = Some(RunState::Blocked);
                    debug!(
                        task = %info.name,
                        upstream = %failed_task,
                        "blocked by upstream failure"
                    );
                    newly_blocked.push(info.name.clone());
                    stack.extend(self.graph.dependents_of(&name).iter().cloned());
                }
            }
        }

        newly_blocked
    }

    /// Collect tasks that are `Pending` and whose requirements are satisfied,
    /// mark them as `Running`, and return them in plan order.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        // Decide first, then mutate to avoid borrowing issues.
        let mut candidates: Vec<(usize, TaskName)> = self
            .tasks
            .values()
            .filter(|info| {
                matches!(info.run_state, Some(RunState::Pending))
                    && self.deps_satisfied_for_info(info)
            })
            .map(|info| (info.order, info.name.clone()))
            .collect();
        candidates.sort();

        let mut ready = Vec::with_capacity(candidates.len());
        for (_, name) in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                info!(
                    task = %info.name,
                    kind = info.action.kind(),
                    "requirements satisfied; scheduling task"
                );
                info.run_state = Some(RunState::Running);
                ready.push(ScheduledTask::from_task_info(info));
            }
        }

        ready
    }

    /// Check if all tasks are in a terminal state.
    pub fn all_tasks_terminal(&self) -> bool {
        self.tasks
            .values()
            .all(|info| info.run_state.is_none_or(RunState::is_terminal))
    }
}

/// A read-only view of the state manager for checking dependency satisfaction.
///
/// This is used when we only have shared access to the tasks map (e.g. in `Scheduler::deps_satisfied`).
pub struct ReadOnlyStateManager<'a> {
    tasks: &'a HashMap<TaskName, TaskInfo>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(tasks: &'a HashMap<TaskName, TaskInfo>) -> Self {
        Self { tasks }
    }

    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        for dep_name in &info.deps {
            let Some(dep) = self.tasks.get(dep_name) else {
                warn!(
                    task = %info.name,
                    dep = %dep_name,
                    "dependency missing from tasks map"
                );
                return false;
            };

            match dep.run_state {
                Some(state) if state.satisfies_dependents() => {}
                _ => return false,
            }
        }

        true
    }
}
