use chrono::{DateTime, Utc};

/// Which side of the device a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DevicePosition {
    Front,
    Back,
}

impl DevicePosition {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// A camera available for capture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaptureDevice {
    pub id: String,
    pub name: String,
    pub position: DevicePosition,
}

/// Hardware configuration lock held on the active device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceLock {
    #[default]
    Free,
    LockedForConfiguration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlashMode {
    #[default]
    Off,
    On,
    Auto,
}

/// Point of interest in normalized preview coordinates (0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusPoint {
    pub x: f64,
    pub y: f64,
}

impl FocusPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

/// Opaque reference to the preview surface a capture was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Per-request settings handed to the hardware.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoSettings {
    pub surface: SurfaceHandle,
    pub flash: FlashMode,
}

/// A decoded capture, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    /// Encoded bytes exactly as delivered by the hardware.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
}
