//! HTTP transport.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::path::Path;

use super::progress::ProgressReporter;
use super::{label_for, write_stream, TransferOutcome};
use crate::config::TransportConfig;
use crate::error::{AssetError, Result};

/// Downloads artifacts with a single GET request
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.http_timeout)
            .connect_timeout(config.http_connect_timeout)
            .user_agent(&config.user_agent);

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| AssetError::Config(format!("Invalid proxy {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| AssetError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Download `url` to `local_path`.
    ///
    /// An existing file is kept when the server reports a `Content-Length`
    /// equal to its size. Without a length the transfer always happens.
    pub fn download(
        &self,
        url: &str,
        local_path: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<TransferOutcome> {
        log::debug!("GET {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| AssetError::network(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AssetError::network(url, format!("bad status: {}", status)));
        }

        let remote_size = response.content_length();
        let label = label_for(url);

        if let Some(outcome) = TransferOutcome::check_existing(local_path, remote_size, &label) {
            return Ok(outcome);
        }

        write_stream(&mut response, local_path, remote_size, &label, url, progress)
    }
}
