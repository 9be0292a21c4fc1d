// src/tasks/target.rs

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::fs::FileSystem;

/// A file output whose existence marks the producing task as complete.
///
/// No checksum or timestamp is consulted: if a regular file exists at the
/// path, the task is done. A directory of the same name does not count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target {
    path: PathBuf,
}

impl Target {
    /// Wrap a path that is already absolute.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve `path` to its absolute form and wrap it.
    pub fn resolve(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        Ok(Self::new(fs.absolute(path)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self, fs: &dyn FileSystem) -> bool {
        fs.is_file(&self.path)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
