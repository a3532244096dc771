use thiserror::Error;

/// Errors reported by the selection and capture subsystems.
///
/// None of these are fatal. Every variant is delivered through a return value
/// or a completion and leaves the owning component in a reusable state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GalleryError {
    /// No camera access. Terminal until the host's permission flow succeeds
    /// and `setup()` is called again.
    #[error("camera access not authorized")]
    Unauthorized,

    #[error("capture device not available")]
    DeviceUnavailable,

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("persistence failed: {0}")]
    PersistenceFailed(String),

    /// Per-item and non-fatal: the item contributes 0 bytes to the aggregate
    /// and is omitted from batch results.
    #[error("asset resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("a capture is already in progress")]
    CaptureInProgress,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("selection limit of {limit} items reached")]
    SelectionLimitReached { limit: usize },

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}

impl GalleryError {
    /// Whether this error ended a capture request (hardware, decode or write).
    pub fn is_capture_failure(&self) -> bool {
        matches!(self, Self::CaptureFailed(_) | Self::PersistenceFailed(_))
    }
}
