// src/config/validate.rs

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ReadQcError, Result};
use crate::types::ReadSpec;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ReadQcError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let samples = resolve_read_specs(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.qc, samples))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_samples(cfg)?;
    validate_global_config(cfg)?;
    validate_qc_section(cfg)?;
    validate_sample_names(cfg)?;
    Ok(())
}

fn ensure_has_samples(cfg: &RawConfigFile) -> Result<()> {
    if cfg.samples.is_empty() {
        return Err(ReadQcError::ConfigError(
            "config must contain at least one entry in [samples]".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    let c = &cfg.config;

    if c.workdir.as_os_str().is_empty() {
        return Err(ReadQcError::ConfigError(
            "[config].workdir must not be empty".to_string(),
        ));
    }
    if c.bindir.as_os_str().is_empty() {
        return Err(ReadQcError::ConfigError(
            "[config].bindir must not be empty".to_string(),
        ));
    }
    if c.qc_program.trim().is_empty() {
        return Err(ReadQcError::ConfigError(
            "[config].qc_program must not be empty".to_string(),
        ));
    }
    if c.num_cpus == 0 {
        return Err(ReadQcError::ConfigError(
            "[config].num_cpus must be >= 1 (got 0)".to_string(),
        ));
    }
    if c.workers == 0 {
        return Err(ReadQcError::ConfigError(
            "[config].workers must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_qc_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.qc.min_length == 0 {
        return Err(ReadQcError::ConfigError(
            "[qc].min_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Sample names become directory names and output prefixes, so they may not
/// contain path separators or start with a dot.
fn validate_sample_names(cfg: &RawConfigFile) -> Result<()> {
    for name in cfg.samples.keys() {
        if !is_valid_sample_name(name) {
            return Err(ReadQcError::ConfigError(format!(
                "invalid sample name '{}': use letters, digits, '.', '_' or '-', not starting with '.'",
                name
            )));
        }
    }
    Ok(())
}

pub fn is_valid_sample_name(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_\-][A-Za-z0-9._\-]*$").expect("sample name regex is valid")
    });
    re.is_match(name)
}

fn resolve_read_specs(cfg: &RawConfigFile) -> Result<BTreeMap<String, ReadSpec>> {
    let mut samples = BTreeMap::new();
    for (name, raw) in cfg.samples.iter() {
        let spec = ReadSpec::from_raw(raw).map_err(|reason| ReadQcError::InvalidReadSpec {
            sample: name.clone(),
            reason,
        })?;
        samples.insert(name.clone(), spec);
    }
    Ok(samples)
}
