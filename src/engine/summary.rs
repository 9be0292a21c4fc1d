// src/engine/summary.rs

//! End-of-run report.

use std::fmt;

use crate::engine::{TaskFailure, TaskName};
use crate::tasks::PrepareFailure;

/// What happened to every task that took part in a run.
///
/// Lists keep plan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Tasks whose action ran and succeeded.
    pub succeeded: Vec<TaskName>,
    /// Tasks skipped because their output target already existed.
    pub already_complete: Vec<TaskName>,
    pub failed: Vec<(TaskName, TaskFailure)>,
    /// Tasks never dispatched because a requirement failed.
    pub blocked: Vec<TaskName>,
    /// Tasks still pending or running when the run was interrupted.
    pub unfinished: Vec<TaskName>,
    /// Samples dropped before scheduling (e.g. their directory could not be created).
    pub prepare_failures: Vec<PrepareFailure>,
}

impl RunSummary {
    /// A run succeeds when nothing failed, nothing was blocked or left
    /// unfinished, and every sample could be prepared.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
            && self.blocked.is_empty()
            && self.unfinished.is_empty()
            && self.prepare_failures.is_empty()
    }

    pub fn is_failed(&self, task: &str) -> bool {
        self.failed.iter().any(|(name, _)| name == task)
    }

    /// Why the run did not succeed, one phrase per cause. Empty on success.
    pub fn failure_causes(&self) -> Vec<&'static str> {
        let mut causes = Vec::new();
        if !self.failed.is_empty() {
            causes.push("there were failed tasks");
        } else if !self.blocked.is_empty() {
            causes.push("there were blocked tasks");
        }
        if !self.unfinished.is_empty() {
            causes.push("the run was interrupted");
        }
        if !self.prepare_failures.is_empty() {
            causes.push("some samples could not be prepared");
        }
        causes
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.succeeded.len()
            + self.already_complete.len()
            + self.failed.len()
            + self.blocked.len()
            + self.unfinished.len();

        writeln!(f, "===== readqc execution summary =====")?;
        writeln!(f, "scheduled {total} task(s):")?;

        if !self.succeeded.is_empty() {
            writeln!(f, "* {} ran successfully:", self.succeeded.len())?;
            for name in &self.succeeded {
                writeln!(f, "    - {name}")?;
            }
        }
        if !self.already_complete.is_empty() {
            writeln!(f, "* {} complete ones were encountered:", self.already_complete.len())?;
            for name in &self.already_complete {
                writeln!(f, "    - {name}")?;
            }
        }
        if !self.failed.is_empty() {
            writeln!(f, "* {} failed:", self.failed.len())?;
            for (name, failure) in &self.failed {
                writeln!(f, "    - {name} ({failure})")?;
            }
        }
        if !self.blocked.is_empty() {
            writeln!(f, "* {} were blocked by failed requirements:", self.blocked.len())?;
            for name in &self.blocked {
                writeln!(f, "    - {name}")?;
            }
        }
        if !self.unfinished.is_empty() {
            writeln!(f, "* {} did not finish:", self.unfinished.len())?;
            for name in &self.unfinished {
                writeln!(f, "    - {name}")?;
            }
        }
        if !self.prepare_failures.is_empty() {
            writeln!(f, "* {} sample(s) could not be prepared:", self.prepare_failures.len())?;
            for failure in &self.prepare_failures {
                writeln!(f, "    - {}: {}", failure.sample, failure.error)?;
            }
        }

        if self.is_success() {
            return write!(f, "this progress looks :) because there were no failed tasks");
        }
        write!(f, "this progress looks :( because {}", self.failure_causes().join(" and "))
    }
}
