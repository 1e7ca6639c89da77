//! FTP transport and directory listing.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use suppaftp::list::File as ListLine;
use suppaftp::types::FileType;
use suppaftp::{FtpStream, Mode};

use super::progress::ProgressReporter;
use super::{label_for, write_stream, TransferOutcome};
use crate::cache::remove_file_if_exists;
use crate::config::{FtpConfig, TransportConfig};
use crate::error::{AssetError, Result};

/// One entry of a remote directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub is_directory: bool,
}

/// Downloads and lists files on the configured FTP server
pub struct FtpDownloader {
    config: FtpConfig,
    connect_timeout: Duration,
}

impl FtpDownloader {
    pub fn new(config: FtpConfig, transport: &TransportConfig) -> Self {
        Self {
            config,
            connect_timeout: transport.ftp_connect_timeout,
        }
    }

    /// Download `remote_path` to `local_path`.
    ///
    /// Servers that do not answer `SIZE` are downloaded unconditionally,
    /// with a warning sent to the reporter.
    pub fn download(
        &self,
        remote_path: &str,
        local_path: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<TransferOutcome> {
        let mut session = FtpSession::open(&self.config, self.connect_timeout)?;
        let target = session.target(remote_path);
        let label = label_for(remote_path);

        let remote_size = match session.stream.size(remote_path) {
            Ok(size) => Some(size as u64),
            Err(e) => {
                progress.warn(&format!(
                    "could not get size of '{}' from FTP: {}; downloading without size check",
                    label, e
                ));
                None
            }
        };

        if let Some(outcome) = TransferOutcome::check_existing(local_path, remote_size, &label) {
            return Ok(outcome);
        }

        let mut data = session
            .stream
            .retr_as_stream(remote_path)
            .map_err(|e| AssetError::network(&target, format!("failed to start download: {}", e)))?;

        let outcome = write_stream(&mut data, local_path, remote_size, &label, &target, progress)?;

        if let Err(e) = session.stream.finalize_retr_stream(data) {
            if let Err(cleanup) = remove_file_if_exists(local_path) {
                log::warn!("Failed to remove unconfirmed download {}: {}", local_path.display(), cleanup);
            }
            return Err(AssetError::network(&target, format!("transfer not confirmed: {}", e)));
        }

        Ok(outcome)
    }

    /// List a remote directory. `.` and `..` and unparseable lines are dropped.
    pub fn list(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        let mut session = FtpSession::open(&self.config, self.connect_timeout)?;
        let target = session.target(path);

        let lines = session
            .stream
            .list(Some(path))
            .map_err(|e| AssetError::network(&target, format!("failed to list directory: {}", e)))?;

        let entries = lines
            .iter()
            .filter_map(|line| match ListLine::from_str(line) {
                Ok(file) => Some(RemoteEntry {
                    name: file.name().to_string(),
                    is_directory: file.is_directory(),
                }),
                Err(e) => {
                    log::debug!("Skipping unparseable LIST line {:?}: {:?}", line, e);
                    None
                }
            })
            .filter(|entry| entry.name != "." && entry.name != "..")
            .collect();

        Ok(entries)
    }
}

/// A logged-in control connection. Dropping it sends `QUIT`.
struct FtpSession {
    stream: FtpStream,
    address: String,
}

impl FtpSession {
    fn open(config: &FtpConfig, timeout: Duration) -> Result<Self> {
        let address = config.address();
        let mut stream = connect(&address, timeout)?;

        if let Err(e) = stream.login(config.user.as_str(), config.pass.as_str()) {
            let _ = stream.quit();
            return Err(AssetError::network(&address, format!("FTP login failed: {}", e)));
        }

        let mut session = Self { stream, address };
        session.stream.set_mode(Mode::Passive);
        session
            .stream
            .transfer_type(FileType::Binary)
            .map_err(|e| AssetError::network(&session.address, format!("failed to set binary mode: {}", e)))?;

        log::debug!("Connected to FTP {}", session.address);
        Ok(session)
    }

    fn target(&self, path: &str) -> String {
        format!("ftp://{}/{}", self.address, path.trim_start_matches('/'))
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        if let Err(e) = self.stream.quit() {
            log::debug!("FTP QUIT to {} failed: {}", self.address, e);
        }
    }
}

fn connect(address: &str, timeout: Duration) -> Result<FtpStream> {
    let addrs: Vec<SocketAddr> = address
        .to_socket_addrs()
        .map_err(|e| AssetError::network(address, format!("failed to resolve FTP host: {}", e)))?
        .collect();

    let mut last_error = None;
    for addr in addrs {
        match FtpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    Err(AssetError::network(
        address,
        format!(
            "failed to connect to FTP: {}",
            last_error.unwrap_or_else(|| "no addresses resolved".to_string())
        ),
    ))
}
