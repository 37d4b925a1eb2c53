use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::StoreError;

/// Read-only view of the download directory.
pub trait ArtifactStore {
    fn exists(&self, name: &str) -> bool;
    /// Size of `name` in bytes, `None` when it does not exist.
    fn size_of(&self, name: &str) -> io::Result<Option<u64>>;
    /// Names of the regular files currently present.
    fn entries(&self) -> io::Result<BTreeSet<String>>;
}

#[derive(Debug, Clone)]
pub struct LocalDir {
    dir: PathBuf,
}

impl LocalDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactStore for LocalDir {
    fn exists(&self, name: &str) -> bool {
        self.dir.join(name).exists()
    }

    fn size_of(&self, name: &str) -> io::Result<Option<u64>> {
        match fs::metadata(self.dir.join(name)) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn entries(&self) -> io::Result<BTreeSet<String>> {
        let names = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        Ok(names)
    }
}

/// Ensure the download directory exists and is writable; create it if missing.
pub fn ensure_download_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| StoreError::DownloadDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(StoreError::DownloadDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| StoreError::DownloadDir(e.to_string()))?;
    }
    // The browser writes here, but probe anyway so a read-only mount fails fast.
    NamedTempFile::new_in(dir).map_err(|e| StoreError::DownloadDir(e.to_string()))?;
    Ok(())
}

/// Writes whole files through a temporary sibling so readers never see a partial file.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, StoreError> {
        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|err| StoreError::Io(err.error))?;
        Ok(target)
    }
}

/// Choose the in-progress file among entries that appeared after triggering.
///
/// Prefers the name derived from the identity, then anything carrying the
/// transient suffix, then whatever appeared first.
pub fn pick_transient(appeared: &BTreeSet<String>, derived: &str, suffix: &str) -> Option<String> {
    if appeared.contains(derived) {
        return Some(derived.to_string());
    }
    appeared
        .iter()
        .find(|name| name.ends_with(suffix))
        .or_else(|| appeared.iter().next())
        .cloned()
}
