//! Zip extraction.
//!
//! Full extraction is not transactional: when an unsafe entry aborts the
//! run, entries written before it stay on disk. Callers needing atomicity
//! should extract into a temporary directory and rename on success.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{AssetError, Result};
use crate::util::{has_drive_prefix, join_under, normalize_separators};

/// Zip archive extractor
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    /// Extract every entry of `archive_path` into `dest_dir`
    pub fn extract(archive_path: &Path, dest_dir: &Path) -> Result<()> {
        let mut archive = open(archive_path)?;

        fs::create_dir_all(dest_dir).map_err(|e| AssetError::fs(dest_dir, e))?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| invalid(archive_path, format!("Failed to read zip entry: {}", e)))?;

            let name = entry.name().to_string();
            let outpath = contained_path(dest_dir, &name)
                .ok_or_else(|| AssetError::UnsafeArchivePath { entry: name.clone() })?;

            if entry.is_dir() {
                fs::create_dir_all(&outpath).map_err(|e| AssetError::fs(&outpath, e))?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).map_err(|e| AssetError::fs(parent, e))?;
            }

            let mut outfile = File::create(&outpath).map_err(|e| AssetError::fs(&outpath, e))?;
            std::io::copy(&mut entry, &mut outfile).map_err(|e| AssetError::fs(&outpath, e))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o7777))
                        .map_err(|e| AssetError::fs(&outpath, e))?;
                }
            }

            log::trace!("Extracted {}", outpath.display());
        }

        log::debug!("Extracted {} into {}", archive_path.display(), dest_dir.display());
        Ok(())
    }

    /// Extract the single entry named `member` into the file `dest`.
    ///
    /// Separators are normalized on both sides; the comparison is otherwise
    /// exact and case-sensitive. The first matching entry wins.
    pub fn extract_member(archive_path: &Path, member: &str, dest: &Path) -> Result<()> {
        let mut archive = open(archive_path)?;
        let wanted = normalize_separators(member);

        let index = (0..archive.len())
            .find(|&i| {
                archive
                    .name_for_index(i)
                    .is_some_and(|name| normalize_separators(name) == wanted)
            })
            .ok_or_else(|| AssetError::ArchiveMemberNotFound {
                member: wanted.clone(),
                archive: archive_path.to_path_buf(),
            })?;

        let mut entry = archive
            .by_index(index)
            .map_err(|e| invalid(archive_path, format!("Failed to read zip entry: {}", e)))?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AssetError::fs(parent, e))?;
        }

        let mut outfile = File::create(dest).map_err(|e| AssetError::fs(dest, e))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| AssetError::fs(dest, e))?;

        log::debug!("Extracted {} from {} to {}", wanted, archive_path.display(), dest.display());
        Ok(())
    }
}

fn open(archive_path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(archive_path).map_err(|e| AssetError::fs(archive_path, e))?;
    ZipArchive::new(BufReader::new(file))
        .map_err(|e| invalid(archive_path, format!("Failed to open zip: {}", e)))
}

fn invalid(path: &Path, reason: String) -> AssetError {
    AssetError::InvalidArchive {
        path: path.to_path_buf(),
        reason,
    }
}

/// Join `name` onto `dest_dir`, or `None` if it would escape it.
///
/// `..` may be used as long as it never climbs above the destination, while
/// absolute names and drive prefixes are refused.
fn contained_path(dest_dir: &Path, name: &str) -> Option<PathBuf> {
    let normalized = normalize_separators(name);
    if normalized.starts_with('/') || has_drive_prefix(&normalized) {
        return None;
    }
    join_under(dest_dir, &normalized)
}
