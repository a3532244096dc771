use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use gallery_picker_core::{AssetHandle, AssetId, CapturedPhoto, GalleryError, PersistenceWriter};

use crate::metadata::{self, AssetMetadata};

/// Persists captured photos into a library directory.
///
/// Each photo is stored byte-for-byte as `<uuid>.<ext>` (extension from the
/// encoded format), followed by its `<uuid>.metadata.json` sidecar. The image
/// file is removed again if the sidecar cannot be written, so a sidecar's
/// presence marks a complete asset.
pub struct LibraryWriter {
    library: PathBuf,
}

impl LibraryWriter {
    pub fn new(library: impl Into<PathBuf>) -> Self {
        Self {
            library: library.into(),
        }
    }

    pub fn library(&self) -> &Path {
        &self.library
    }
}

impl PersistenceWriter for LibraryWriter {
    fn write(&self, photo: &CapturedPhoto) -> Result<AssetHandle, GalleryError> {
        fs::create_dir_all(&self.library)
            .map_err(|e| {
                GalleryError::PersistenceFailed(format!("failed to create library: {}", e))
            })?;

        let format = image::guess_format(&photo.data)
            .map_err(|e| GalleryError::PersistenceFailed(format!("unknown image format: {}", e)))?;
        let extension = format.extensions_str().first().copied().unwrap_or("img");

        let id = AssetId::generate();
        let file_name = format!("{}.{}", id, extension);
        let path = self.library.join(&file_name);
        fs::write(&path, &photo.data)
            .map_err(|e| {
                GalleryError::PersistenceFailed(format!("failed to write {}: {}", file_name, e))
            })?;

        let checksum = sha256_file(&path)?;
        let record = AssetMetadata {
            id: id.clone(),
            file_name,
            width: photo.width,
            height: photo.height,
            byte_size: photo.data.len() as u64,
            sha256: checksum,
            created_at: Utc::now(),
        };
        if let Err(e) = metadata::write_metadata(&record, &self.library) {
            fs::remove_file(&path).ok();
            return Err(e);
        }

        log::info!("saved {} ({} bytes) to {}", id, record.byte_size, self.library.display());
        Ok(AssetHandle::new(id, photo.width, photo.height))
    }
}

/// Checksum of the file as it landed on disk.
fn sha256_file(path: &Path) -> Result<String, GalleryError> {
    let data = fs::read(path)
        .map_err(|e| {
            GalleryError::PersistenceFailed(format!("failed to read file for checksum: {}", e))
        })?;
    Ok(metadata::sha256_hex(&data))
}
