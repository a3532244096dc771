use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gallery_picker_core::{AssetId, GalleryError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Sidecar record stored next to each library asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub id: AssetId,
    /// Name of the image file within the library directory.
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
    /// Hex SHA-256 of the image file.
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

/// Whether `name` names an entry directly inside the library directory.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

/// `{library}/{id}.metadata.json`, or `None` when `id` would leave the
/// library directory.
pub fn sidecar_path(library: &Path, id: &AssetId) -> Option<PathBuf> {
    is_plain_name(id.as_str()).then(|| library.join(format!("{}.metadata.json", id)))
}

/// Write the sidecar for `metadata.id` into `library`.
pub fn write_metadata(metadata: &AssetMetadata, library: &Path) -> Result<(), GalleryError> {
    let path = sidecar_path(library, &metadata.id)
        .ok_or_else(|| {
            GalleryError::PersistenceFailed(format!("invalid asset id {:?}", metadata.id.as_str()))
        })?;
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| {
            GalleryError::PersistenceFailed(format!("failed to serialize metadata: {}", e))
        })?;
    fs::write(path, json)
        .map_err(|e| GalleryError::PersistenceFailed(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read the sidecar of asset `id` from `library`.
///
/// Fails for ids and recorded file names that point outside `library`.
pub fn read_metadata(library: &Path, id: &AssetId) -> Result<AssetMetadata, GalleryError> {
    let path = sidecar_path(library, id)
        .ok_or_else(|| {
            GalleryError::ResolutionFailed(format!("invalid asset id {:?}", id.as_str()))
        })?;
    let json = fs::read_to_string(path)
        .map_err(|e| {
            GalleryError::ResolutionFailed(format!("failed to read metadata for {}: {}", id, e))
        })?;
    let metadata: AssetMetadata = serde_json::from_str(&json)
        .map_err(|e| {
            GalleryError::ResolutionFailed(format!("failed to parse metadata for {}: {}", id, e))
        })?;
    if !is_plain_name(&metadata.file_name) {
        return Err(GalleryError::ResolutionFailed(format!(
            "metadata for {} names file {:?} outside the library",
            id, metadata.file_name
        )));
    }
    Ok(metadata)
}

/// Hex-encoded SHA-256 digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{:02x}", b)).collect()
}
