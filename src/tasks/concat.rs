// src/tasks/concat.rs

use std::path::PathBuf;

use crate::engine::TaskName;
use crate::tasks::external::ExternalFileCheck;
use crate::tasks::target::Target;
use crate::tasks::{TaskAction, TaskSpec};

/// Merge the raw fragment files of one read direction into a single FASTQ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatFragments {
    pub sample: String,
    /// 1 for forward, 2 for reverse.
    pub read: u8,
    pub inputs: Vec<ExternalFileCheck>,
    pub dest: Target,
}

impl ConcatFragments {
    pub fn task_name(&self) -> TaskName {
        format!("concat:{}:R{}", self.sample, self.read)
    }

    pub fn sources(&self) -> Vec<PathBuf> {
        self.inputs
            .iter()
            .map(|i| i.target().path().to_path_buf())
            .collect()
    }

    pub fn into_spec(self) -> TaskSpec {
        let name = self.task_name();
        let sources = self.sources();
        let requires = self.inputs.iter().map(|i| i.task_name()).collect();
        TaskSpec {
            name,
            sample: Some(self.sample),
            requires,
            output: Some(self.dest),
            action: TaskAction::Concatenate { sources },
        }
    }
}
