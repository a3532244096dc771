use crate::models::capture_models::CaptureDevice;
use crate::models::error::GalleryError;
use crate::models::state::CaptureSessionState;

/// Event delegate for capture session notifications.
///
/// Methods are called from the session thread (or the caller's thread for
/// `setup` failures), not a UI thread. Implementations should marshal to the
/// UI thread if needed.
pub trait CaptureSessionDelegate: Send + Sync {
    fn on_state_changed(&self, state: CaptureSessionState);

    /// The camera cannot be used: `Unauthorized` or `DeviceUnavailable`.
    fn on_unavailable(&self, error: &GalleryError);

    /// The session is running and ready for capture.
    fn on_started(&self);

    /// A new input device was bound (initial start or switch).
    fn on_device_changed(&self, device: &CaptureDevice);
}
