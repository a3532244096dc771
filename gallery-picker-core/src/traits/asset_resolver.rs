use crate::models::asset_models::{AssetData, AssetHandle};
use crate::models::config::QualityTier;
use crate::models::error::GalleryError;

/// Completion for a single asset resolution.
///
/// Invoked exactly once, from whatever thread the resolver completes on.
pub type ResolveCallback = Box<dyn FnOnce(Result<AssetData, GalleryError>) + Send + 'static>;

/// Resolves asset handles to image data on demand.
///
/// Implemented by:
/// - `LibraryResolver` (gallery-picker-fs)
/// - test fakes that complete synchronously or on demand
///
/// Resolutions are independent and side-effect free, so callers may issue any
/// number of them concurrently.
pub trait AssetResolver: Send + Sync {
    /// Resolve `asset` at `tier`, delivering the result via `completion`.
    ///
    /// May complete synchronously on the calling thread.
    fn resolve(&self, asset: &AssetHandle, tier: QualityTier, completion: ResolveCallback);
}
