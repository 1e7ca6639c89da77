use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{AssetError, Result};

/// How a cached artifact is materialized at its destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArtifactType {
    /// Extracted recursively into the destination directory
    Zip,
    /// Copied into the destination directory under its remote file name
    File,
    /// Anything else found in the catalog; rejected when processed
    Other(String),
}

impl From<String> for ArtifactType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "zip" => ArtifactType::Zip,
            "file" => ArtifactType::File,
            _ => ArtifactType::Other(value),
        }
    }
}

impl From<ArtifactType> for String {
    fn from(value: ArtifactType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactType::Zip => f.write_str("zip"),
            ArtifactType::File => f.write_str("file"),
            ArtifactType::Other(kind) => f.write_str(kind),
        }
    }
}

/// Transport used to fetch an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum TransportKind {
    #[default]
    Http,
    Ftp,
    /// Unrecognised `download_method`; rejected when downloading
    Other(String),
}

impl TransportKind {
    /// Parse a `download_method` value. Matching is case-insensitive and an
    /// empty value means HTTP.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "" | "HTTP" => TransportKind::Http,
            "FTP" => TransportKind::Ftp,
            _ => TransportKind::Other(value.to_string()),
        }
    }
}

impl From<String> for TransportKind {
    fn from(value: String) -> Self {
        TransportKind::parse(&value)
    }
}

impl From<TransportKind> for String {
    fn from(value: TransportKind) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Http => f.write_str("HTTP"),
            TransportKind::Ftp => f.write_str("FTP"),
            TransportKind::Other(method) => f.write_str(method),
        }
    }
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Remote location; its basename names the cache file
    pub url: String,

    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,

    /// Path under the install root
    #[serde(default)]
    pub destination: String,

    #[serde(rename = "download_method", default)]
    pub transport: TransportKind,
}

impl AssetDescriptor {
    pub fn new(url: impl Into<String>, artifact_type: ArtifactType, destination: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            artifact_type,
            destination: destination.into(),
            transport: TransportKind::Http,
        }
    }

    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Basename of the remote URL.
    ///
    /// Two descriptors whose URLs share a basename map to the same cache file.
    pub fn file_name(&self) -> Result<&str> {
        let trimmed = self.url.trim_end_matches('/');
        let name = trimmed.rsplit('/').next().unwrap_or_default();

        match name {
            "" | "." | ".." => Err(AssetError::InvalidDescriptor(format!(
                "URL '{}' has no file name",
                self.url
            ))),
            name => Ok(name),
        }
    }
}

/// Asset name to descriptor mapping. Names are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: HashMap<String, AssetDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, descriptor: AssetDescriptor) {
        self.entries.insert(name.into(), descriptor);
    }

    /// Look up an asset by name
    pub fn resolve(&self, name: &str) -> Result<&AssetDescriptor> {
        self.entries
            .get(name)
            .ok_or_else(|| AssetError::AssetNotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AssetDescriptor)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

impl<S: Into<String>> FromIterator<(S, AssetDescriptor)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (S, AssetDescriptor)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(name, d)| (name.into(), d)).collect(),
        }
    }
}
