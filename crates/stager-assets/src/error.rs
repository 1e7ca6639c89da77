use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    // Catalog errors
    #[error("Asset '{name}' not found in catalog")]
    AssetNotFound { name: String },

    #[error("Unknown download method: {method}")]
    UnknownTransport { method: String },

    #[error("Unknown asset type: {kind}")]
    UnknownArtifactType { kind: String },

    #[error("Invalid asset descriptor: {0}")]
    InvalidDescriptor(String),

    // Network errors
    #[error("Network error ({target}): {reason}")]
    Network { target: String, reason: String },

    #[error("Failed to download asset '{asset}' to cache: {source}")]
    Download {
        asset: String,
        #[source]
        source: Box<AssetError>,
    },

    // Archive errors
    #[error("Unsafe path in archive: {entry}")]
    UnsafeArchivePath { entry: String },

    #[error("File '{member}' not found in archive '{}'", archive.display())]
    ArchiveMemberNotFound { member: String, archive: PathBuf },

    #[error("Invalid archive {}: {reason}", path.display())]
    InvalidArchive { path: PathBuf, reason: String },

    // IO errors
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AssetError {
    pub(crate) fn network(target: impl Into<String>, reason: impl ToString) -> Self {
        AssetError::Network {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AssetError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// The innermost error, looking through the asset-name wrapper added by
    /// cache downloads.
    pub fn root_cause(&self) -> &AssetError {
        match self {
            AssetError::Download { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssetError>;
