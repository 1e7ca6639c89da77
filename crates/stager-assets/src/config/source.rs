use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::config::Config;
use crate::error::{AssetError, Result};

/// Loads configuration from a file or URL, applying environment overrides
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Get a STAGER_* environment variable
    pub fn get_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.is_empty())
    }

    /// Platform cache directory used when the configuration names none
    pub fn default_cache_dir(&self) -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "stager") {
            proj_dirs.cache_dir().join("assets")
        } else {
            PathBuf::from(".stager").join("assets")
        }
    }

    /// Load configuration from a local path or an `http(s)://` URL
    pub fn load(&self, path_or_url: &str) -> Result<Config> {
        let contents = if is_url(path_or_url) {
            log::info!("Loading configuration from URL: {}", path_or_url);
            self.fetch(path_or_url)?
        } else {
            log::info!("Reading configuration file: {}", path_or_url);
            self.read(Path::new(path_or_url))?
        };

        let mut config = Config::from_json(&contents)?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Apply environment overrides and fill in defaults
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(root) = self.get_env("STAGER_ROOT_PATH") {
            config.root_path = PathBuf::from(root);
        }
        if let Some(cache) = self.get_env("STAGER_CACHE_DIR") {
            config.assets_cache_path = PathBuf::from(cache);
        }
        if let Some(host) = self.get_env("STAGER_FTP_HOST") {
            config.ftp.host = host;
        }
        if let Some(user) = self.get_env("STAGER_FTP_USER") {
            config.ftp.user = user;
        }
        if let Some(pass) = self.get_env("STAGER_FTP_PASS") {
            config.ftp.pass = pass;
        }

        if config.assets_cache_path.as_os_str().is_empty() {
            config.assets_cache_path = self.default_cache_dir();
            log::debug!(
                "No cache path configured, using {}",
                config.assets_cache_path.display()
            );
        }
    }

    fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .map_err(|e| AssetError::Config(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn fetch(&self, url: &str) -> Result<String> {
        let response = reqwest::blocking::get(url)
            .map_err(|e| AssetError::Config(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Config(format!(
                "Failed to fetch {}: bad status: {}",
                url, status
            )));
        }

        response
            .text()
            .map_err(|e| AssetError::Config(format!("Failed to read {}: {}", url, e)))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
