use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    #[serde(default)]
    pub name: String,
    pub version: String,
}

/// Where the middleware's own name and version come from. Loaded once per
/// middleware instance.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn load(&self) -> Result<PackageMetadata>;
}

/// Metadata of this crate, fixed at compile time.
#[derive(Clone, Copy, Debug, Default)]
pub struct CrateMetadata;

#[async_trait]
impl MetadataSource for CrateMetadata {
    async fn load(&self) -> Result<PackageMetadata> {
        Ok(PackageMetadata {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

/// A JSON manifest (e.g. `package.json`) with at least a `version` field.
#[derive(Clone, Debug)]
pub struct ManifestFile(pub PathBuf);

#[async_trait]
impl MetadataSource for ManifestFile {
    async fn load(&self) -> Result<PackageMetadata> {
        read_json_file(&self.0).await
    }
}

pub async fn read_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    debug!("Reading {}", path.display());

    let contents = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&contents)?)
}
