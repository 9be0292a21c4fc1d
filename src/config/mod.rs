// src/config/mod.rs

//! `ReadQC.toml`: the `[config]` and `[qc]` tables plus the `[samples]` map.
//!
//! [`load_and_validate`] is the entry point; it yields a [`ConfigFile`]
//! whose read specs are already resolved.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, QcSection, RawConfigFile};
