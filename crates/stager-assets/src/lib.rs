//! Asset acquisition and staging.
//!
//! Resolves catalog entries to remote artifacts, downloads them over HTTP or
//! FTP into a flat cache keyed by remote file name, and materializes cached
//! artifacts into an install root by copy or zip extraction.

pub mod cache;
pub mod config;
pub mod downloader;
pub mod error;
pub mod manager;
mod util;

pub use cache::CacheStore;
pub use config::{ArtifactType, AssetDescriptor, Catalog, Config, ConfigLoader, FtpConfig, TransportConfig, TransportKind};
pub use downloader::{ArchiveExtractor, NoProgress, ProgressManager, ProgressReporter, RemoteEntry, TransferOutcome};
pub use error::{AssetError, Result};
pub use manager::{AssetManager, AssetProvider};
