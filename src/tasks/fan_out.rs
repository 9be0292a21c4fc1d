// src/tasks/fan_out.rs

//! Expansion of the `[samples]` mapping into per-sample QC tasks.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::config::{ConfigFile, QcSection};
use crate::errors::{ReadQcError, Result};
use crate::fs::FileSystem;
use crate::tasks::concat::ConcatFragments;
use crate::tasks::external::ExternalFileCheck;
use crate::tasks::paired_qc::PairedSampleQcTask;
use crate::tasks::plan::TaskPlan;
use crate::tasks::target::Target;
use crate::tasks::{TaskAction, TaskSpec};
use crate::types::ReadSpec;

/// Name of the wrapper task that requires every sample's QC task.
pub const WRAPPER_TASK: &str = "all-qc";

/// Subdirectory of `<workdir>/<sample>` receiving QC outputs.
pub const TRIM_DIR_NAME: &str = "trimming_results";

/// A sample that could not be prepared (its directory could not be created)
/// and was left out of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareFailure {
    pub sample: String,
    pub error: String,
}

/// Result of the fan-out: the plan for every prepared sample, plus the
/// samples that failed preparation.
#[derive(Debug, Clone)]
pub struct FanOut {
    pub plan: TaskPlan,
    pub prepare_failures: Vec<PrepareFailure>,
}

/// Coordinator yielding one QC task per sample.
///
/// It produces no target of its own; in the plan it is the `all-qc` goal,
/// complete once every sample's QC task is.
#[derive(Debug, Clone)]
pub struct AllSamplesQcWrapper {
    samples: BTreeMap<String, ReadSpec>,
    workdir: PathBuf,
    num_cpus: usize,
    bindir: PathBuf,
    qc: QcSection,
    program: String,
    inherited_path: Option<OsString>,
    only: Vec<String>,
}

impl AllSamplesQcWrapper {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            samples: cfg.samples.clone(),
            workdir: cfg.config.workdir.clone(),
            num_cpus: cfg.config.num_cpus,
            bindir: cfg.config.bindir.clone(),
            qc: cfg.qc,
            program: cfg.config.qc_program.clone(),
            inherited_path: std::env::var_os("PATH"),
            only: Vec::new(),
        }
    }

    /// Use `path` instead of the process's `PATH` as the search path the
    /// tools directory is prefixed onto.
    pub fn with_inherited_path(mut self, path: Option<OsString>) -> Self {
        self.inherited_path = path;
        self
    }

    /// Restrict the fan-out to these samples. An empty list means all.
    pub fn with_sample_filter(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    /// `<workdir>/<sample>/trimming_results`, absolute.
    pub fn trim_dir(&self, fs: &dyn FileSystem, sample: &str) -> Result<PathBuf> {
        let workdir = fs.absolute(&self.workdir)?;
        Ok(workdir.join(sample).join(TRIM_DIR_NAME))
    }

    /// Create each sample's output directory and build the plan.
    ///
    /// A sample whose directory cannot be created is reported in
    /// `prepare_failures` and skipped; the others are unaffected.
    pub fn build(&self, fs: &dyn FileSystem) -> Result<FanOut> {
        self.expand(fs, true)
    }

    /// Build the plan without touching the filesystem (used for `--dry-run`).
    pub fn plan_only(&self, fs: &dyn FileSystem) -> Result<FanOut> {
        self.expand(fs, false)
    }

    fn selected_samples(&self) -> Result<Vec<(&String, &ReadSpec)>> {
        for name in &self.only {
            if !self.samples.contains_key(name) {
                return Err(ReadQcError::UnknownSample(name.clone()));
            }
        }
        Ok(self
            .samples
            .iter()
            .filter(|(name, _)| self.only.is_empty() || self.only.iter().any(|o| o == *name))
            .collect())
    }

    fn expand(&self, fs: &dyn FileSystem, create_dirs: bool) -> Result<FanOut> {
        let mut plan = TaskPlan::new();
        let mut prepare_failures = Vec::new();
        let mut qc_tasks = Vec::new();

        for (sample, spec) in self.selected_samples()? {
            let trim_dir = self.trim_dir(fs, sample)?;

            if create_dirs && !fs.is_dir(&trim_dir) {
                if let Err(e) = fs.create_dir_all(&trim_dir) {
                    error!(
                        sample = %sample,
                        dir = %trim_dir.display(),
                        error = %e,
                        "could not create sample output directory; skipping sample"
                    );
                    prepare_failures.push(PrepareFailure {
                        sample: sample.clone(),
                        error: format!("{e:#}"),
                    });
                    continue;
                }
                debug!(sample = %sample, dir = %trim_dir.display(), "created output directory");
            }

            let qc_name = self.add_sample_tasks(fs, &mut plan, sample, spec, trim_dir)?;
            qc_tasks.push(qc_name);
        }

        plan.push(TaskSpec {
            name: WRAPPER_TASK.to_string(),
            sample: None,
            requires: qc_tasks,
            output: None,
            action: TaskAction::Aggregate,
        })?;
        plan.add_goal(WRAPPER_TASK);

        info!(
            tasks = plan.len(),
            prepare_failures = prepare_failures.len(),
            "fan-out complete"
        );

        Ok(FanOut {
            plan,
            prepare_failures,
        })
    }

    /// Declare the input checks, optional concatenations and the QC task for
    /// one sample. Returns the QC task's name.
    fn add_sample_tasks(
        &self,
        fs: &dyn FileSystem,
        plan: &mut TaskPlan,
        sample: &str,
        spec: &ReadSpec,
        trim_dir: PathBuf,
    ) -> Result<String> {
        let (forward, reverse, requires) = match spec {
            ReadSpec::SingleDelimited { forward, reverse } => {
                let fwd = ExternalFileCheck::new(fs, forward)?;
                let rev = ExternalFileCheck::new(fs, reverse)?;
                let requires = vec![fwd.task_name(), rev.task_name()];
                let paths = (
                    fwd.target().path().to_path_buf(),
                    rev.target().path().to_path_buf(),
                );
                plan.push_shared(fwd.into_spec());
                plan.push_shared(rev.into_spec());
                (paths.0, paths.1, requires)
            }
            ReadSpec::Fragmented { forward, reverse } => {
                let r1 = self.concat_task(fs, plan, sample, 1, forward, &trim_dir)?;
                let r2 = self.concat_task(fs, plan, sample, 2, reverse, &trim_dir)?;
                let requires = vec![r1.task_name(), r2.task_name()];
                let paths = (r1.dest.path().to_path_buf(), r2.dest.path().to_path_buf());
                plan.push(r1.into_spec())?;
                plan.push(r2.into_spec())?;
                (paths.0, paths.1, requires)
            }
        };

        let qc = PairedSampleQcTask {
            sample: sample.to_string(),
            forward,
            reverse,
            requires,
            num_cpus: self.num_cpus,
            qc_outdir: trim_dir,
            bindir: self.bindir.clone(),
            qc: self.qc,
            program: self.program.clone(),
        };
        let name = qc.task_name();
        plan.push(qc.into_spec(self.inherited_path.as_deref())?)?;
        Ok(name)
    }

    fn concat_task(
        &self,
        fs: &dyn FileSystem,
        plan: &mut TaskPlan,
        sample: &str,
        read: u8,
        fragments: &[PathBuf],
        trim_dir: &Path,
    ) -> Result<ConcatFragments> {
        let mut inputs = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let check = ExternalFileCheck::new(fs, fragment)?;
            plan.push_shared(check.clone().into_spec());
            inputs.push(check);
        }
        Ok(ConcatFragments {
            sample: sample.to_string(),
            read,
            inputs,
            dest: Target::new(trim_dir.join(format!("{sample}_R{read}.fastq"))),
        })
    }
}
