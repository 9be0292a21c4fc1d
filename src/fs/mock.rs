// src/fs/mock.rs

use super::FileSystem;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

type Entries = Arc<Mutex<HashMap<PathBuf, MockEntry>>>;

/// In-memory filesystem for tests.
///
/// Paths are stored verbatim; relative paths are resolved against `cwd` by
/// [`FileSystem::absolute`]. Writes under a denied prefix fail, which lets
/// tests exercise directory-creation and write errors.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    files: Entries,
    cwd: PathBuf,
    denied: Arc<Mutex<Vec<PathBuf>>>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_cwd("/mock")
    }

    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into();
        let mut files = HashMap::new();
        files.insert(PathBuf::from("/"), MockEntry::Dir);

        let fs = Self {
            files: Arc::new(Mutex::new(files)),
            cwd: cwd.clone(),
            denied: Arc::new(Mutex::new(Vec::new())),
        };
        fs.add_dir(&cwd);
        fs
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();
        if let Some(parent) = path.parent() {
            ensure_dirs(&mut files, parent);
        }
        files.insert(path, MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = self.files.lock().unwrap();
        ensure_dirs(&mut files, path.as_ref());
    }

    /// Make every write at or below `prefix` fail.
    pub fn deny_writes_under(&self, prefix: impl Into<PathBuf>) {
        self.denied.lock().unwrap().push(prefix.into());
    }

    /// Contents of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap();
        match files.get(path.as_ref()) {
            Some(MockEntry::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        let denied = self.denied.lock().unwrap();
        if denied.iter().any(|prefix| path.starts_with(prefix)) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        Ok(())
    }
}

fn ensure_dirs(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    for ancestor in path.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        files
            .entry(ancestor.to_path_buf())
            .or_insert(MockEntry::Dir);
    }
}

/// Writer that appends into the shared entry on every `write`.
struct MockWriter {
    files: Entries,
    path: PathBuf,
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut files = self.files.lock().unwrap();
        match files.get_mut(&self.path) {
            Some(MockEntry::File(data)) => {
                data.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file vanished while writing: {:?}", self.path),
            )),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::Dir))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.check_writable(path)?;
        let mut files = self.files.lock().unwrap();
        if let Some(MockEntry::File(_)) = files.get(path) {
            return Err(anyhow!("File exists: {:?}", path));
        }
        ensure_dirs(&mut files, path);
        Ok(())
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File(content)) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn create_write(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        self.check_writable(path)?;
        let mut files = self.files.lock().unwrap();
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                if !matches!(files.get(parent), Some(MockEntry::Dir)) {
                    return Err(anyhow!("Parent directory missing: {:?}", parent));
                }
            }
            _ => {}
        }
        files.insert(path.to_path_buf(), MockEntry::File(Vec::new()));
        Ok(Box::new(MockWriter {
            files: Arc::clone(&self.files),
            path: path.to_path_buf(),
        }))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.check_writable(to)?;
        let mut files = self.files.lock().unwrap();
        let entry = files
            .remove(from)
            .ok_or_else(|| anyhow!("File not found: {:?}", from))?;
        files.insert(to.to_path_buf(), entry);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File(_)) => {
                files.remove(path);
                Ok(())
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.cwd.join(path))
        }
    }
}
