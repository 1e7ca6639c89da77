use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::catalog::{AssetDescriptor, Catalog};
use crate::error::{AssetError, Result};
use crate::util::join_under;

pub const DEFAULT_FTP_PORT: u16 = 21;

const DEFAULT_USER_AGENT: &str = concat!("stager/", env!("CARGO_PKG_VERSION"));
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Asset-related settings of the deployment configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Install root; asset destinations are relative to it
    #[serde(default)]
    pub root_path: PathBuf,

    /// Flat directory holding raw downloaded artifacts
    #[serde(default)]
    pub assets_cache_path: PathBuf,

    #[serde(rename = "ftp_config", default)]
    pub ftp: FtpConfig,

    #[serde(default)]
    pub asset_catalog: Catalog,
}

impl Config {
    pub fn new(root_path: impl Into<PathBuf>, assets_cache_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            assets_cache_path: assets_cache_path.into(),
            ..Default::default()
        }
    }

    pub fn with_ftp(mut self, ftp: FtpConfig) -> Self {
        self.ftp = ftp;
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.asset_catalog = catalog;
        self
    }

    /// Parse a configuration document
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| AssetError::Config(format!("Failed to parse configuration: {}", e)))
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn cache_path(&self) -> &Path {
        &self.assets_cache_path
    }

    /// Install directory of an asset.
    ///
    /// The destination always resolves beneath `root_path`: absolute
    /// destinations are re-rooted there, and one that climbs above the root
    /// with `..` is rejected.
    pub fn destination_for(&self, descriptor: &AssetDescriptor) -> Result<PathBuf> {
        join_under(&self.root_path, &descriptor.destination).ok_or_else(|| {
            AssetError::InvalidDescriptor(format!(
                "destination '{}' escapes the install root {}",
                descriptor.destination,
                self.root_path.display()
            ))
        })
    }
}

/// FTP connection settings shared by downloads and listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtpConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

impl FtpConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            pass: pass.into(),
        }
    }

    /// `host:port`, with the default FTP port appended when none is given
    pub fn address(&self) -> String {
        let host = self.host.trim();

        if let Ok(IpAddr::V6(ip)) = host.parse::<IpAddr>() {
            return format!("[{}]:{}", ip, DEFAULT_FTP_PORT);
        }

        match host.rsplit_once(':') {
            Some((_, port)) if port.parse::<u16>().is_ok() => host.to_string(),
            _ => format!("{}:{}", host, DEFAULT_FTP_PORT),
        }
    }
}

/// Network settings injected into the asset manager
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Overall HTTP request timeout. `None` leaves transfers unbounded.
    pub http_timeout: Option<Duration>,
    pub http_connect_timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<String>,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub use_system_proxy: bool,
    pub ftp_connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            http_timeout: None,
            http_connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            use_system_proxy: true,
            ftp_connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    pub fn with_http_connect_timeout(mut self, timeout: Duration) -> Self {
        self.http_connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn without_system_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }

    pub fn with_ftp_connect_timeout(mut self, timeout: Duration) -> Self {
        self.ftp_connect_timeout = timeout;
        self
    }
}
