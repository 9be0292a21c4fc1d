// src/tasks/external.rs

use std::path::Path;

use crate::engine::TaskName;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::tasks::target::Target;
use crate::tasks::{TaskAction, TaskSpec};

/// An input file supplied from outside the pipeline.
///
/// It has nothing to run: when scheduled it only re-checks that its file is
/// present, failing with `MissingInput` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFileCheck {
    target: Target,
}

impl ExternalFileCheck {
    pub fn new(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        Ok(Self {
            target: Target::resolve(fs, path)?,
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn task_name(&self) -> TaskName {
        format!("input:{}", self.target)
    }

    pub fn into_spec(self) -> TaskSpec {
        TaskSpec {
            name: self.task_name(),
            sample: None,
            requires: Vec::new(),
            output: Some(self.target),
            action: TaskAction::CheckExists,
        }
    }
}
