//! Progress reporting for transfers.
//!
//! Progress is a side channel: reporters never fail and never block the
//! copy they observe. Drawing is throttled to at most ten redraws per
//! second.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, ErrorKind, Read, Write};
use std::time::Duration;

const DRAW_HZ: u8 = 10;
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Receives transfer status from the downloaders
pub trait ProgressReporter {
    /// Start tracking a transfer. `total` is `None` when the remote size is unknown.
    fn begin(&self, label: &str, total: Option<u64>) -> Box<dyn TransferProgress>;

    /// Non-fatal condition the caller should know about
    fn warn(&self, message: &str) {
        log::warn!("{}", message);
    }
}

/// A single tracked transfer
pub trait TransferProgress {
    fn advance(&mut self, bytes: u64);

    /// Completion notice; consumes the tracker so it fires once
    fn finish(self: Box<Self>);

    /// The transfer failed
    fn abandon(self: Box<Self>);
}

/// Terminal progress bars on stderr
pub struct ProgressManager {
    multi: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(enabled: bool) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(DRAW_HZ)),
            enabled,
        }
    }

    /// Create a download progress bar, or a byte-counting spinner when the size is unknown
    pub fn create_download_bar(&self, name: &str, total: Option<u64>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = match total {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec}) {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb
            }
        };

        let pb = self.multi.add(pb);
        pb.set_message(name.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Check if progress is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ProgressReporter for ProgressManager {
    fn begin(&self, label: &str, total: Option<u64>) -> Box<dyn TransferProgress> {
        Box::new(self.create_download_bar(label, total))
    }

    fn warn(&self, message: &str) {
        if !self.enabled {
            log::warn!("{}", message);
            return;
        }
        let line = format!("{} {}", console::style("Warning:").yellow().bold(), message);
        if self.multi.println(&line).is_err() {
            log::warn!("{}", message);
        }
    }
}

impl TransferProgress for ProgressBar {
    fn advance(&mut self, bytes: u64) {
        self.inc(bytes);
    }

    fn finish(self: Box<Self>) {
        let message = format!("{} done", self.message());
        self.finish_with_message(message);
    }

    fn abandon(self: Box<Self>) {
        ProgressBar::abandon(&self);
    }
}

/// Reporter for headless callers
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn begin(&self, _label: &str, _total: Option<u64>) -> Box<dyn TransferProgress> {
        Box::new(NoProgress)
    }
}

impl TransferProgress for NoProgress {
    fn advance(&mut self, _bytes: u64) {}
    fn finish(self: Box<Self>) {}
    fn abandon(self: Box<Self>) {}
}

/// Which side of a copy failed
#[derive(Debug)]
pub(crate) enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

/// Stream `reader` into `writer`, reporting every chunk
pub(crate) fn copy_with_progress<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    progress: &mut dyn TransferProgress,
) -> std::result::Result<u64, CopyError> {
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };

        writer.write_all(&buffer[..n]).map_err(CopyError::Write)?;
        written += n as u64;
        progress.advance(n as u64);
    }

    writer.flush().map_err(CopyError::Write)?;
    Ok(written)
}

/// Helper to format bytes for display
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
