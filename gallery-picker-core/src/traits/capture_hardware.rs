use crate::models::capture_models::{CaptureDevice, FlashMode, FocusPoint, PhotoSettings};
use crate::models::config::QualityTier;
use crate::models::error::GalleryError;

/// Completion for a hardware photo request: the encoded image bytes.
pub type PhotoCallback = Box<dyn FnOnce(Result<Vec<u8>, GalleryError>) + Send + 'static>;

/// Interface to the platform camera stack.
///
/// Only `CaptureSessionManager` talks to the hardware. Session-level calls
/// (configuration, inputs, start/stop) arrive on the manager's serial session
/// thread; `capture_photo` arrives on the caller's thread and may complete
/// on any thread.
pub trait CaptureHardware: Send + Sync {
    /// Whether the user granted camera access.
    fn is_authorized(&self) -> bool;

    /// Cameras currently present.
    fn devices(&self) -> Vec<CaptureDevice>;

    fn begin_configuration(&self);

    fn commit_configuration(&self);

    /// Bind `device` as the session input.
    fn add_input(&self, device: &CaptureDevice) -> Result<(), GalleryError>;

    fn remove_input(&self, device: &CaptureDevice);

    /// Attach the still-photo output. Called once per session start.
    fn add_photo_output(&self) -> Result<(), GalleryError>;

    fn supports_preset(&self, device: &CaptureDevice, preset: QualityTier) -> bool;

    fn set_preset(&self, preset: QualityTier);

    fn start_running(&self);

    fn stop_running(&self);

    fn lock_for_configuration(&self, device: &CaptureDevice) -> Result<(), GalleryError>;

    fn unlock_for_configuration(&self, device: &CaptureDevice);

    fn supports_focus_lock(&self, device: &CaptureDevice) -> bool;

    fn set_focus_point(&self, device: &CaptureDevice, point: FocusPoint);

    fn supports_flash(&self, device: &CaptureDevice, mode: FlashMode) -> bool;

    /// Issue a still capture. `completion` fires exactly once.
    fn capture_photo(&self, settings: PhotoSettings, completion: PhotoCallback);
}
