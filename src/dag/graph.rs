// src/dag/graph.rs

use std::collections::HashMap;

use crate::tasks::TaskPlan;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    /// Direct requirements: tasks that must complete before this one runs.
    deps: Vec<String>,
    /// Direct dependents: tasks that require this one.
    dependents: Vec<String>,
}

/// Simple in-memory DAG representation keyed by task name.
///
/// Acyclicity is checked by `TaskPlan::validate`; here we just keep
/// adjacency information for scheduling and diagnostics.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: HashMap<String, DagNode>,
}

impl DagGraph {
    /// Build a DAG from a validated [`TaskPlan`].
    pub fn from_plan(plan: &TaskPlan) -> Self {
        let mut nodes: HashMap<String, DagNode> = HashMap::new();

        for task in plan.tasks() {
            nodes.insert(
                task.name.clone(),
                DagNode {
                    deps: task.requires.clone(),
                    dependents: Vec::new(),
                },
            );
        }

        // Dependents are filled in plan order so traversal stays deterministic.
        for task in plan.tasks() {
            for dep in &task.requires {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(task.name.clone());
                }
            }
        }

        Self { nodes }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Immediate requirements of a task.
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that require this one).
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
