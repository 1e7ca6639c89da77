//! Flat on-disk cache of downloaded artifacts.
//!
//! Artifacts are stored under their remote file name, so the cache path of
//! an asset is a pure function of its URL. Two catalog entries whose URLs
//! share a basename share a cache file.
//!
//! Nothing here locks a cache path against concurrent writers: callers that
//! fetch the same asset from several threads must serialize those calls.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::AssetDescriptor;
use crate::error::{AssetError, Result};

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the cache directory if it does not exist
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| AssetError::fs(&self.dir, e))
    }

    /// Local path for an asset: `<cache>/<basename of url>`
    pub fn path_for(&self, descriptor: &AssetDescriptor) -> Result<PathBuf> {
        Ok(self.dir.join(descriptor.file_name()?))
    }

    /// Remove the cached artifact of an asset. Returns whether a file was removed.
    pub fn evict(&self, descriptor: &AssetDescriptor) -> Result<bool> {
        let path = self.path_for(descriptor)?;
        remove_file_if_exists(&path)
    }

    /// Total size in bytes of the cached artifacts
    pub fn size(&self) -> Result<u64> {
        let mut total = 0;
        for path in self.files()? {
            let metadata = fs::metadata(&path).map_err(|e| AssetError::fs(&path, e))?;
            total += metadata.len();
        }
        Ok(total)
    }

    /// Remove every cached artifact, returning the number of bytes freed
    pub fn clear(&self) -> Result<u64> {
        let mut freed = 0;
        for path in self.files()? {
            let len = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            if remove_file_if_exists(&path)? {
                log::debug!("Removed {}", path.display());
                freed += len;
            }
        }
        Ok(freed)
    }

    /// Cached files, sorted by name. A missing cache directory is empty.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AssetError::fs(&self.dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AssetError::fs(&self.dir, e))?;
            let file_type = entry.file_type().map_err(|e| AssetError::fs(entry.path(), e))?;
            if file_type.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Delete a file, treating absence as success
pub(crate) fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AssetError::fs(path, e)),
    }
}

/// Delete a directory tree, treating absence as success
pub(crate) fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AssetError::fs(path, e)),
    }
}
