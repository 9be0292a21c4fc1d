// src/tasks/paired_qc.rs

//! The per-sample FaQCs invocation.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::config::QcSection;
use crate::engine::TaskName;
use crate::errors::{ReadQcError, Result};
use crate::tasks::target::Target;
use crate::tasks::{TaskAction, TaskSpec};

/// Everything needed to launch the QC program once: program, ordered
/// arguments, and the environment variables to overlay on the child.
///
/// The overlay is applied to the spawned command only; the calling process's
/// environment is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub env: Vec<(OsString, OsString)>,
}

impl RunSpec {
    /// Arguments as display strings (lossy for non-UTF-8 paths).
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Shell-like one-line rendering for logs and dry-run output.
    pub fn command_line(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in self.display_args() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }

    /// Value the overlay assigns to `key`, if any.
    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }
}

/// Run FaQCs on one sample's forward/reverse reads.
#[derive(Debug, Clone)]
pub struct PairedSampleQcTask {
    pub sample: String,
    pub forward: PathBuf,
    pub reverse: PathBuf,
    /// Upstream tasks producing or checking the two read files.
    pub requires: Vec<TaskName>,
    pub num_cpus: usize,
    /// Absolute output directory (`-d`).
    pub qc_outdir: PathBuf,
    /// Directory prefixed onto `PATH` for the invocation.
    pub bindir: PathBuf,
    pub qc: QcSection,
    pub program: String,
}

impl PairedSampleQcTask {
    pub fn task_name(&self) -> TaskName {
        format!("qc:{}", self.sample)
    }

    /// `<qc_outdir>/<sample>.stats.txt`; the only artifact tracked for
    /// completion.
    pub fn output(&self) -> Target {
        Target::new(self.qc_outdir.join(format!("{}.stats.txt", self.sample)))
    }

    /// Ordered FaQCs arguments.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(14);
        let mut flag = |name: &str, value: OsString| {
            args.push(OsString::from(name));
            args.push(value);
        };
        flag("-min_L", self.qc.min_length.to_string().into());
        flag("-n", self.qc.n_cutoff.to_string().into());
        flag("-t", self.num_cpus.to_string().into());
        flag("-prefix", OsString::from(&self.sample));
        flag("-d", self.qc_outdir.clone().into_os_string());
        flag("-1", self.forward.clone().into_os_string());
        flag("-2", self.reverse.clone().into_os_string());
        args
    }

    /// Assemble the full invocation, prefixing `bindir` onto
    /// `inherited_path` (normally the caller's `PATH`).
    pub fn run_spec(&self, inherited_path: Option<&OsStr>) -> Result<RunSpec> {
        let path = prefixed_search_path(&self.bindir, inherited_path)?;
        Ok(RunSpec {
            program: OsString::from(&self.program),
            args: self.args(),
            env: vec![(OsString::from("PATH"), path)],
        })
    }

    pub fn into_spec(self, inherited_path: Option<&OsStr>) -> Result<TaskSpec> {
        let run_spec = self.run_spec(inherited_path)?;
        Ok(TaskSpec {
            name: self.task_name(),
            output: Some(self.output()),
            sample: Some(self.sample),
            requires: self.requires,
            action: TaskAction::RunQc(run_spec),
        })
    }
}

fn prefixed_search_path(bindir: &Path, inherited: Option<&OsStr>) -> Result<OsString> {
    let mut dirs = vec![bindir.to_path_buf()];
    if let Some(existing) = inherited {
        dirs.extend(std::env::split_paths(existing));
    }
    std::env::join_paths(dirs).map_err(|e| {
        ReadQcError::ConfigError(format!(
            "cannot prefix {:?} onto PATH: {}",
            bindir, e
        ))
    })
}
