//! Artifact files: read once, checksum, parse.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::ArtifactError;

/// Provenance of a loaded artifact, reported by the readiness endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: u64,
    pub loaded_at: DateTime<Utc>,
}

/// SHA-256 of `bytes` as lowercase hex
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Read and deserialize a JSON artifact
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<(T, ArtifactInfo), ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let info = ArtifactInfo {
        path: path.to_path_buf(),
        sha256: checksum(&bytes),
        size_bytes: bytes.len() as u64,
        loaded_at: Utc::now(),
    };

    tracing::debug!("Read {} ({} bytes, sha256 {})", path.display(), info.size_bytes, info.sha256);

    Ok((parsed, info))
}
