//! Capture pipeline stages after the hardware callback.
//!
//! ```text
//! [hardware bytes] → decode → [CapturedPhoto] → persist → [AssetHandle]
//! ```
//!
//! Each stage returns a typed `Result`, so the whole pipeline is one
//! `and_then` chain and the manager resolves the pending capture in one place.

use std::io::Cursor;

use chrono::Utc;
use image::ImageReader;

use crate::models::asset_models::AssetHandle;
use crate::models::capture_models::CapturedPhoto;
use crate::models::error::GalleryError;
use crate::traits::persistence_writer::PersistenceWriter;

/// Validate the encoded capture and read its dimensions.
///
/// Only the image header is parsed; pixels are not decoded.
pub fn decode(data: Vec<u8>) -> Result<CapturedPhoto, GalleryError> {
    if data.is_empty() {
        return Err(GalleryError::CaptureFailed("hardware returned no image data".into()));
    }

    let (width, height) = {
        let reader = ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .map_err(|e| GalleryError::CaptureFailed(format!("unreadable capture: {}", e)))?;
        if reader.format().is_none() {
            return Err(GalleryError::CaptureFailed("unrecognized image format".into()));
        }
        reader
            .into_dimensions()
            .map_err(|e| GalleryError::CaptureFailed(format!("decode failed: {}", e)))?
    };

    Ok(CapturedPhoto {
        data,
        width,
        height,
        captured_at: Utc::now(),
    })
}

/// Hand the photo to durable storage. Any writer error becomes `PersistenceFailed`.
pub fn persist(
    writer: &dyn PersistenceWriter,
    photo: &CapturedPhoto,
) -> Result<AssetHandle, GalleryError> {
    writer.write(photo).map_err(|e| match e {
        GalleryError::PersistenceFailed(_) => e,
        other => GalleryError::PersistenceFailed(other.to_string()),
    })
}

/// Decode then persist.
pub fn run(writer: &dyn PersistenceWriter, data: Vec<u8>) -> Result<AssetHandle, GalleryError> {
    decode(data).and_then(|photo| persist(writer, &photo))
}
