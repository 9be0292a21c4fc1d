#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use readqc::config::{ConfigFile, ConfigSection, QcSection, RawConfigFile};
use readqc::types::RawReadSpec;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    /// Start from defaults with the given working and tools directories.
    pub fn new(workdir: impl Into<PathBuf>, bindir: impl Into<PathBuf>) -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection {
                    workdir: workdir.into(),
                    bindir: bindir.into(),
                    num_cpus: 1,
                    workers: 1,
                    qc_program: "FaQCs".to_string(),
                },
                qc: QcSection::default(),
                samples: BTreeMap::new(),
            },
        }
    }

    /// `name = "<forward>:<reverse>"`.
    pub fn with_pair(mut self, name: &str, forward: &str, reverse: &str) -> Self {
        self.config.samples.insert(
            name.to_string(),
            RawReadSpec::Single(format!("{forward}:{reverse}")),
        );
        self
    }

    /// `name = ["<r1 fragments>", "<r2 fragments>"]`.
    pub fn with_fragments(mut self, name: &str, forward: &[&str], reverse: &[&str]) -> Self {
        self.config.samples.insert(
            name.to_string(),
            RawReadSpec::Fragmented(vec![forward.join(","), reverse.join(",")]),
        );
        self
    }

    pub fn with_raw_sample(mut self, name: &str, spec: RawReadSpec) -> Self {
        self.config.samples.insert(name.to_string(), spec);
        self
    }

    pub fn num_cpus(mut self, n: usize) -> Self {
        self.config.config.num_cpus = n;
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.config.workers = n;
        self
    }

    pub fn qc_program(mut self, program: &str) -> Self {
        self.config.config.qc_program = program.to_string();
        self
    }

    pub fn min_length(mut self, n: u32) -> Self {
        self.config.qc.min_length = n;
        self
    }

    pub fn n_cutoff(mut self, n: u32) -> Self {
        self.config.qc.n_cutoff = n;
        self
    }

    /// The unvalidated form, for tests exercising validation errors.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}
