use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::config::QualityTier;

/// Opaque, stable identifier of a library asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identifier for newly persisted assets.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to an asset in the photo library.
///
/// Identity is the asset id. Two handles for the same asset compare equal even
/// when the cached pixel dimensions differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetHandle {
    pub id: AssetId,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl AssetHandle {
    pub fn new(id: AssetId, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            id,
            pixel_width,
            pixel_height,
        }
    }
}

impl PartialEq for AssetHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AssetHandle {}

impl Hash for AssetHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// One selected image. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionItem {
    asset: AssetHandle,
}

impl SelectionItem {
    pub fn new(asset: AssetHandle) -> Self {
        Self { asset }
    }

    pub fn asset(&self) -> &AssetHandle {
        &self.asset
    }

    pub fn id(&self) -> &AssetId {
        &self.asset.id
    }
}

/// The single selected video, if any.
#[derive(Debug, Clone)]
pub struct VideoSelection {
    asset: AssetHandle,
    duration_secs: f64,
}

impl VideoSelection {
    pub fn new(asset: AssetHandle, duration_secs: f64) -> Self {
        Self {
            asset,
            duration_secs,
        }
    }

    pub fn asset(&self) -> &AssetHandle {
        &self.asset
    }

    pub fn id(&self) -> &AssetId {
        &self.asset.id
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

impl PartialEq for VideoSelection {
    fn eq(&self, other: &Self) -> bool {
        self.asset == other.asset
    }
}

impl Eq for VideoSelection {}

/// Resolved asset content at some quality tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetData {
    pub width: u32,
    pub height: u32,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl AssetData {
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Pixel box an asset is resolved into for a given tier.
///
/// `Original` requests the asset's native dimensions.
pub fn target_size(asset: &AssetHandle, tier: QualityTier) -> (u32, u32) {
    match tier {
        QualityTier::Low => (640, 480),
        QualityTier::Medium => (1280, 720),
        QualityTier::High => (3840, 2160),
        QualityTier::Original => (asset.pixel_width, asset.pixel_height),
    }
}

/// Bytes per megabyte for the aggregate size (decimal, as shown to users).
pub const BYTES_PER_MB: f64 = 1_000_000.0;

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}
