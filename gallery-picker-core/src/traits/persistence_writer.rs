use crate::models::asset_models::AssetHandle;
use crate::models::capture_models::CapturedPhoto;
use crate::models::error::GalleryError;

/// Durable storage for captured photos.
///
/// Called on the capture manager's dedicated write thread, never on the
/// session thread, so a slow write cannot stall the camera.
pub trait PersistenceWriter: Send + Sync {
    /// Store `photo` and return the handle of the newly created asset.
    fn write(&self, photo: &CapturedPhoto) -> Result<AssetHandle, GalleryError>;
}
