//! Configuration for asset staging.
//!
//! The configuration is a JSON document shared with the rest of the
//! deployment tool. Only the keys the asset subsystem needs are read; any
//! other top-level sections are ignored.
//!
//! # Example
//!
//! ```json
//! {
//!   "root_path": "C:/deploy",
//!   "assets_cache_path": "C:/deploy/.cache",
//!   "ftp_config": { "host": "ftp.example.org", "user": "deploy", "pass": "secret" },
//!   "asset_catalog": {
//!     "nssm": {
//!       "url": "https://example.org/dist/nssm.zip",
//!       "type": "zip",
//!       "destination": "tools/nssm"
//!     },
//!     "front": {
//!       "url": "ftp://ftp.example.org/distr/Setup.Front.exe",
//!       "type": "file",
//!       "destination": "installers",
//!       "download_method": "ftp"
//!     }
//!   }
//! }
//! ```
//!
//! # Environment
//!
//! When loaded with [`ConfigLoader::new(true)`](ConfigLoader::new), the
//! following variables override the file: `STAGER_ROOT_PATH`,
//! `STAGER_CACHE_DIR`, `STAGER_FTP_HOST`, `STAGER_FTP_USER`,
//! `STAGER_FTP_PASS`.

mod catalog;
mod config;
mod source;

pub use catalog::{ArtifactType, AssetDescriptor, Catalog, TransportKind};
pub use config::{Config, FtpConfig, TransportConfig, DEFAULT_FTP_PORT};
pub use source::ConfigLoader;
