// src/tasks/plan.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::engine::TaskName;
use crate::errors::{ReadQcError, Result};
use crate::tasks::TaskSpec;

/// Fully materialised task list, in declaration order, plus the goal tasks
/// the driver should bring to completion.
#[derive(Debug, Clone, Default)]
pub struct TaskPlan {
    tasks: Vec<TaskSpec>,
    index: HashMap<TaskName, usize>,
    goals: Vec<TaskName>,
}

impl TaskPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task. Names must be unique.
    pub fn push(&mut self, spec: TaskSpec) -> Result<()> {
        if self.index.contains_key(&spec.name) {
            return Err(ReadQcError::ConfigError(format!(
                "task '{}' declared twice",
                spec.name
            )));
        }
        self.index.insert(spec.name.clone(), self.tasks.len());
        self.tasks.push(spec);
        Ok(())
    }

    /// Append a task unless one with the same name exists already.
    ///
    /// Used for input checks, which several tasks may share.
    pub fn push_shared(&mut self, spec: TaskSpec) {
        if !self.index.contains_key(&spec.name) {
            self.index.insert(spec.name.clone(), self.tasks.len());
            self.tasks.push(spec);
        }
    }

    pub fn add_goal(&mut self, name: impl Into<TaskName>) {
        self.goals.push(name.into());
    }

    pub fn goals(&self) -> &[TaskName] {
        &self.goals
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn get(&self, name: &str) -> Option<&TaskSpec> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    /// Position of a task in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Check that the plan forms a well-formed DAG:
    /// - every goal and every `requires` entry names a known task
    /// - no task requires itself
    /// - the graph has no cycles
    pub fn validate(&self) -> Result<()> {
        for goal in &self.goals {
            if !self.index.contains_key(goal) {
                return Err(ReadQcError::TaskNotFound(goal.clone()));
            }
        }

        for task in &self.tasks {
            for dep in &task.requires {
                if dep == &task.name {
                    return Err(ReadQcError::ConfigError(format!(
                        "task '{}' cannot require itself",
                        task.name
                    )));
                }
                if !self.index.contains_key(dep) {
                    return Err(ReadQcError::ConfigError(format!(
                        "task '{}' has unknown requirement '{}'",
                        task.name, dep
                    )));
                }
            }
        }

        // Edge direction: requirement -> task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for task in &self.tasks {
            graph.add_node(task.name.as_str());
        }
        for task in &self.tasks {
            for dep in &task.requires {
                graph.add_edge(dep.as_str(), task.name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(ReadQcError::DagCycle(format!(
                "cycle detected in task graph involving task '{}'",
                cycle.node_id()
            ))),
        }
    }
}
