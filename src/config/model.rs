// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{RawReadSpec, ReadSpec};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// workdir = "work"
/// bindir = "/opt/FaQCs/bin"
/// num_cpus = 4
///
/// [qc]
/// min_length = 50
/// n_cutoff = 2
///
/// [samples]
/// S1 = "reads/S1_1.fq:reads/S1_2.fq"
/// ```
///
/// This is the unvalidated form; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    pub config: ConfigSection,

    #[serde(default)]
    pub qc: QcSection,

    /// Sample name -> read spec. Keys are iterated in sorted order.
    #[serde(default)]
    pub samples: BTreeMap<String, RawReadSpec>,
}

/// Validated configuration with every read spec resolved.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub qc: QcSection,
    pub samples: BTreeMap<String, ReadSpec>,
}

impl ConfigFile {
    /// Build a `ConfigFile` without running validation.
    ///
    /// Only `config::validate` and tests should call this.
    pub fn new_unchecked(
        config: ConfigSection,
        qc: QcSection,
        samples: BTreeMap<String, ReadSpec>,
    ) -> Self {
        Self {
            config,
            qc,
            samples,
        }
    }
}

/// `[config]` section: directories and execution knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Root under which `<sample>/trimming_results` directories are created.
    pub workdir: PathBuf,

    /// Directory prefixed onto `PATH` for the QC invocation.
    pub bindir: PathBuf,

    /// Thread count handed to the QC program (`-t`).
    #[serde(default = "default_num_cpus")]
    pub num_cpus: usize,

    /// Number of task actions allowed to run at the same time.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Program name or path of the QC executable.
    #[serde(default = "default_qc_program")]
    pub qc_program: String,
}

fn default_num_cpus() -> usize {
    1
}

fn default_workers() -> usize {
    1
}

fn default_qc_program() -> String {
    "FaQCs".to_string()
}

/// `[qc]` section: FaQCs tuning parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QcSection {
    /// Minimum retained read length (`-min_L`).
    #[serde(default = "default_min_length")]
    pub min_length: u32,

    /// Ambiguous-base cutoff count (`-n`).
    #[serde(default = "default_n_cutoff")]
    pub n_cutoff: u32,
}

fn default_min_length() -> u32 {
    50
}

fn default_n_cutoff() -> u32 {
    2
}

impl Default for QcSection {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            n_cutoff: default_n_cutoff(),
        }
    }
}
