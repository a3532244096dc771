use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gallery_picker_core::{
    target_size, AssetData, AssetHandle, AssetResolver, GalleryError, QualityTier, ResolveCallback,
    SerialQueue,
};
use image::{imageops::FilterType, DynamicImage, ImageFormat};

use crate::metadata;

const DEFAULT_WORKERS: usize = 4;

/// Reads library assets back at a requested quality tier.
///
/// Requests are spread round-robin over a small pool of `library-resolve-{n}`
/// threads, so one slow decode does not hold up the rest of a selection's
/// fan-out. `resolve` never blocks the caller. `Original` returns the stored
/// bytes unchanged. Lower tiers are downsized to fit the tier's target box
/// (never upscaled) and re-encoded as JPEG.
pub struct LibraryResolver {
    library: Arc<PathBuf>,
    workers: Vec<SerialQueue>,
    next: AtomicUsize,
}

impl LibraryResolver {
    pub fn new(library: impl Into<PathBuf>) -> Result<Self, GalleryError> {
        Self::with_workers(library, DEFAULT_WORKERS)
    }

    /// A resolver with `workers` decode threads (at least one).
    pub fn with_workers(library: impl Into<PathBuf>, workers: usize) -> Result<Self, GalleryError> {
        let workers = (0..workers.max(1))
            .map(|i| SerialQueue::new(&format!("library-resolve-{}", i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            library: Arc::new(library.into()),
            workers,
            next: AtomicUsize::new(0),
        })
    }

    pub fn library(&self) -> &Path {
        &self.library
    }
}

impl AssetResolver for LibraryResolver {
    fn resolve(&self, asset: &AssetHandle, tier: QualityTier, completion: ResolveCallback) {
        let library = Arc::clone(&self.library);
        let asset = asset.clone();
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        self.workers[slot].dispatch(move || {
            let result = load(&library, &asset, tier);
            if let Err(e) = &result {
                log::warn!("failed to resolve {}: {}", asset.id, e);
            }
            completion(result);
        });
    }
}

fn load(library: &Path, asset: &AssetHandle, tier: QualityTier) -> Result<AssetData, GalleryError> {
    let record = metadata::read_metadata(library, &asset.id)?;
    let bytes = fs::read(library.join(&record.file_name))
        .map_err(|e| {
            GalleryError::ResolutionFailed(format!("failed to read {}: {}", record.file_name, e))
        })?;
    if metadata::sha256_hex(&bytes) != record.sha256 {
        return Err(GalleryError::ResolutionFailed(format!("checksum mismatch for {}", asset.id)));
    }

    if tier == QualityTier::Original {
        return Ok(AssetData {
            width: record.width,
            height: record.height,
            bytes,
        });
    }

    let image = image::load_from_memory(&bytes)
        .map_err(|e| {
            GalleryError::ResolutionFailed(format!("failed to decode {}: {}", asset.id, e))
        })?;
    let (max_width, max_height) = target_size(asset, tier);
    let image = if image.width() > max_width || image.height() > max_height {
        image.resize(max_width, max_height, FilterType::Triangle)
    } else {
        image
    };

    // JPEG has no alpha channel.
    let image = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut encoded = Cursor::new(Vec::new());
    image
        .write_to(&mut encoded, ImageFormat::Jpeg)
        .map_err(|e| {
            GalleryError::ResolutionFailed(format!("failed to encode {}: {}", asset.id, e))
        })?;

    Ok(AssetData {
        width: image.width(),
        height: image.height(),
        bytes: encoded.into_inner(),
    })
}
