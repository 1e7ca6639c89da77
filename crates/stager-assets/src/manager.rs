//! Asset manager: fetch to cache, materialize, purge.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::{remove_dir_if_exists, CacheStore};
use crate::config::{ArtifactType, AssetDescriptor, Config, TransportConfig, TransportKind};
use crate::downloader::{
    ArchiveExtractor, FtpDownloader, HttpDownloader, NoProgress, ProgressReporter, RemoteEntry,
    TransferOutcome,
};
use crate::error::{AssetError, Result};

/// Operations the installer modules rely on
pub trait AssetProvider {
    /// The loaded configuration
    fn config(&self) -> &Config;

    /// Fetch an asset into the cache and return its cache path
    fn download_to_cache(&self, name: &str) -> Result<PathBuf>;

    /// Copy or extract a cached artifact into its destination
    fn process_from_cache(&self, name: &str, cache_path: &Path) -> Result<()>;

    /// Fetch and materialize an asset, returning its destination directory
    fn get(&self, name: &str) -> Result<PathBuf> {
        let cache_path = self.download_to_cache(name)?;
        self.process_from_cache(name, &cache_path)?;
        self.destination_of(name)
    }

    /// Destination directory of an asset under the install root
    fn destination_of(&self, name: &str) -> Result<PathBuf> {
        let descriptor = self.config().asset_catalog.resolve(name)?;
        self.config().destination_for(descriptor)
    }

    fn download_http(&self, url: &str, local_path: &Path) -> Result<TransferOutcome>;

    fn download_ftp(&self, remote_path: &str, local_path: &Path) -> Result<TransferOutcome>;

    /// Extract one member of a zip archive to `dest`
    fn extract_file(&self, archive_path: &Path, member: &str, dest: &Path) -> Result<()>;

    fn list_remote_directory(&self, path: &str) -> Result<Vec<RemoteEntry>>;

    /// Remove an asset's cache file and destination directory
    fn purge_asset(&self, name: &str) -> Result<()>;
}

/// Production asset manager over HTTP and FTP
pub struct AssetManager {
    config: Config,
    cache: CacheStore,
    http: HttpDownloader,
    ftp: FtpDownloader,
    progress: Box<dyn ProgressReporter>,
}

impl AssetManager {
    /// Create a manager with default transport settings and no progress output.
    ///
    /// The install root and cache directories are created if missing.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_transport(config, TransportConfig::default())
    }

    pub fn with_transport(config: Config, transport: TransportConfig) -> Result<Self> {
        fs::create_dir_all(&config.root_path).map_err(|e| AssetError::fs(&config.root_path, e))?;

        let cache = CacheStore::new(&config.assets_cache_path);
        cache.ensure_dir()?;

        let http = HttpDownloader::new(&transport)?;
        let ftp = FtpDownloader::new(config.ftp.clone(), &transport);

        Ok(Self {
            config,
            cache,
            http,
            ftp,
            progress: Box::new(NoProgress),
        })
    }

    /// Report transfer progress and warnings through `progress`
    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    fn resolve(&self, name: &str) -> Result<&AssetDescriptor> {
        self.config.asset_catalog.resolve(name)
    }
}

impl AssetProvider for AssetManager {
    fn config(&self) -> &Config {
        &self.config
    }

    fn download_to_cache(&self, name: &str) -> Result<PathBuf> {
        let descriptor = self.resolve(name)?;
        let local_path = self.cache.path_for(descriptor)?;

        let fetched = match &descriptor.transport {
            TransportKind::Http => self.download_http(&descriptor.url, &local_path),
            TransportKind::Ftp => ftp_path(&descriptor.url)
                .and_then(|remote_path| self.download_ftp(&remote_path, &local_path)),
            TransportKind::Other(method) => {
                return Err(AssetError::UnknownTransport {
                    method: method.clone(),
                });
            }
        };

        let outcome = fetched.map_err(|e| AssetError::Download {
            asset: name.to_string(),
            source: Box::new(e),
        })?;

        log::debug!(
            "Asset '{}' cached at {} (skipped: {})",
            name,
            local_path.display(),
            outcome.skipped
        );
        Ok(local_path)
    }

    fn process_from_cache(&self, name: &str, cache_path: &Path) -> Result<()> {
        let descriptor = self.resolve(name)?;
        let dest_dir = self.config.destination_for(descriptor)?;

        fs::create_dir_all(&dest_dir).map_err(|e| AssetError::fs(&dest_dir, e))?;

        match &descriptor.artifact_type {
            ArtifactType::Zip => ArchiveExtractor::extract(cache_path, &dest_dir)?,
            ArtifactType::File => {
                let target = dest_dir.join(descriptor.file_name()?);
                fs::copy(cache_path, &target).map_err(|e| AssetError::fs(&target, e))?;
            }
            ArtifactType::Other(kind) => {
                return Err(AssetError::UnknownArtifactType { kind: kind.clone() });
            }
        }

        log::info!("Asset '{}' processed from cache into {}", name, dest_dir.display());
        Ok(())
    }

    fn download_http(&self, url: &str, local_path: &Path) -> Result<TransferOutcome> {
        self.http.download(url, local_path, self.progress.as_ref())
    }

    fn download_ftp(&self, remote_path: &str, local_path: &Path) -> Result<TransferOutcome> {
        self.ftp.download(remote_path, local_path, self.progress.as_ref())
    }

    fn extract_file(&self, archive_path: &Path, member: &str, dest: &Path) -> Result<()> {
        ArchiveExtractor::extract_member(archive_path, member, dest)
    }

    fn list_remote_directory(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        self.ftp.list(path)
    }

    fn purge_asset(&self, name: &str) -> Result<()> {
        let descriptor = self.resolve(name)?;
        let dest_dir = self.config.destination_for(descriptor)?;

        if self.cache.evict(descriptor)? {
            log::info!("Removed cached file for '{}'", name);
        }

        if dest_dir == self.config.root_path {
            log::warn!(
                "Asset '{}' installs into the root directory itself; leaving {} in place",
                name,
                dest_dir.display()
            );
        } else if remove_dir_if_exists(&dest_dir)? {
            log::info!("Removed {}", dest_dir.display());
        }

        Ok(())
    }
}

/// Server path of an FTP asset: the decoded path component of its URL
fn ftp_path(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)
        .map_err(|e| AssetError::InvalidDescriptor(format!("Invalid FTP URL '{}': {}", url, e)))?;

    urlencoding::decode(parsed.path())
        .map(|path| path.into_owned())
        .map_err(|e| AssetError::InvalidDescriptor(format!("Invalid FTP URL '{}': {}", url, e)))
}
