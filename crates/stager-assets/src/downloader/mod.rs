//! Transports and extraction.
//!
//! Both transports share one contract: fetch a remote artifact to a local
//! path, skipping the transfer when the local file already has the size the
//! remote reports, and never leaving a partial file behind on failure.

mod archive;
mod ftp;
mod http;
mod progress;

pub use archive::ArchiveExtractor;
pub use ftp::{FtpDownloader, RemoteEntry};
pub use http::HttpDownloader;
pub use progress::{format_bytes, NoProgress, ProgressManager, ProgressReporter, TransferProgress};

use std::fs::{self, File};
use std::io::{BufWriter, Read};
use std::path::Path;

use crate::cache::remove_file_if_exists;
use crate::error::{AssetError, Result};
use progress::{copy_with_progress, CopyError};

/// Result of a transport call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    /// The local file already matched the remote size; nothing was transferred
    pub skipped: bool,
    /// Size reported by the remote, if any
    pub remote_size: Option<u64>,
    pub bytes_written: u64,
}

impl TransferOutcome {
    /// A local file satisfies the request only when it exists and the
    /// remote size is known and equal to it.
    pub(crate) fn check_existing(local_path: &Path, remote_size: Option<u64>, label: &str) -> Option<Self> {
        let local_size = fs::metadata(local_path).ok().filter(|m| m.is_file())?.len();

        if remote_size == Some(local_size) {
            log::info!("'{}' already exists and size matches, skipping", label);
            return Some(Self {
                skipped: true,
                remote_size,
                bytes_written: 0,
            });
        }

        match remote_size {
            Some(remote) => log::info!(
                "'{}' exists but size differs ({} local, {} remote), downloading again",
                label, local_size, remote
            ),
            None => log::info!("'{}' exists but remote size is unknown, downloading again", label),
        }
        None
    }
}

/// Stream `reader` into `local_path`. On any failure the partial file is removed.
pub(crate) fn write_stream(
    reader: &mut dyn Read,
    local_path: &Path,
    remote_size: Option<u64>,
    label: &str,
    target: &str,
    progress: &dyn ProgressReporter,
) -> Result<TransferOutcome> {
    if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AssetError::fs(parent, e))?;
    }

    let file = File::create(local_path).map_err(|e| AssetError::fs(local_path, e))?;
    let mut writer = BufWriter::new(file);
    let mut tracker = progress.begin(label, remote_size);

    let copied = copy_with_progress(reader, &mut writer, tracker.as_mut());
    drop(writer);

    let failure = match copied {
        Ok(written) => match remote_size {
            Some(expected) if written != expected => AssetError::network(
                target,
                format!("transfer ended after {} of {} bytes", written, expected),
            ),
            _ => {
                tracker.finish();
                log::info!("Downloaded '{}' ({} bytes)", label, written);
                return Ok(TransferOutcome {
                    skipped: false,
                    remote_size,
                    bytes_written: written,
                });
            }
        },
        Err(CopyError::Read(e)) => AssetError::network(target, format!("error while copying stream: {}", e)),
        Err(CopyError::Write(e)) => AssetError::fs(local_path, e),
    };

    tracker.abandon();
    if let Err(e) = remove_file_if_exists(local_path) {
        log::warn!("Failed to remove partial download {}: {}", local_path.display(), e);
    }
    Err(failure)
}

/// Short name for status output: the last path segment of a URL or remote path
pub(crate) fn label_for(remote: &str) -> String {
    remote
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(remote)
        .to_string()
}
