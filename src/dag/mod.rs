// src/dag/mod.rs

//! Task graph and the skip-if-done scheduler.
//!
//! A [`TaskPlan`](crate::tasks::TaskPlan) becomes a [`DagGraph`]; the
//! [`Scheduler`] walks it from the goals, skipping anything whose target
//! [`completed_tasks`] found on disk, and releases dependents as their
//! requirements succeed.

pub mod completion;
pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use completion::completed_tasks;
pub use graph::DagGraph;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::{ScheduledTask, TaskRunState};
