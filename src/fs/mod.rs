// src/fs/mod.rs

use std::ffi::OsString;
use std::fmt::Debug;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

pub mod mock;

/// Abstract filesystem interface.
///
/// Planning, completion probing and the concatenation action go through this
/// trait so they can run against [`mock::MockFileSystem`] in tests.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>>;

    /// Create (or truncate) a file for writing.
    fn create_write(&self, path: &Path) -> Result<Box<dyn Write + Send>>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Make `path` absolute against the current directory without touching
    /// the filesystem (the path need not exist yet).
    fn absolute(&self, path: &Path) -> Result<PathBuf>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path).with_context(|| format!("opening file {:?}", path))?;
        Ok(Box::new(file))
    }

    fn create_write(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        let file = fs::File::create(path).with_context(|| format!("creating file {:?}", path))?;
        Ok(Box::new(io::BufWriter::new(file)))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).with_context(|| format!("renaming {:?} to {:?}", from, to))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("removing file {:?}", path))
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        std::path::absolute(path).with_context(|| format!("making {:?} absolute", path))
    }
}

/// Sibling path used while `dest` is being written.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name: OsString = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".partial");
    dest.with_file_name(name)
}

/// Byte-concatenate `sources` in order into `dest`.
///
/// Data goes to a `.partial` sibling first and is renamed into place only
/// once every source has been copied, so `dest` never exists half-written.
pub fn concat_files(fs: &dyn FileSystem, sources: &[PathBuf], dest: &Path) -> Result<u64> {
    if sources.is_empty() {
        return Err(anyhow!("no source files to concatenate into {:?}", dest));
    }

    let tmp = partial_path(dest);
    let copied = copy_all(fs, sources, &tmp);

    match copied {
        Ok(bytes) => {
            fs.rename(&tmp, dest)?;
            debug!(dest = %dest.display(), bytes, sources = sources.len(), "concatenated fragments");
            Ok(bytes)
        }
        Err(e) => {
            if fs.exists(&tmp) {
                let _ = fs.remove_file(&tmp);
            }
            Err(e)
        }
    }
}

fn copy_all(fs: &dyn FileSystem, sources: &[PathBuf], tmp: &Path) -> Result<u64> {
    let mut out = fs.create_write(tmp)?;
    let mut total = 0u64;
    for src in sources {
        let mut input = fs.open_read(src)?;
        total += io::copy(&mut input, &mut out)
            .with_context(|| format!("copying {:?} into {:?}", src, tmp))?;
    }
    out.flush().with_context(|| format!("flushing {:?}", tmp))?;
    Ok(total)
}
