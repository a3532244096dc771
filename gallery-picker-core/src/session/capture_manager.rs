use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::dispatch::serial_queue::SerialQueue;
use crate::models::asset_models::AssetHandle;
use crate::models::capture_models::{
    CaptureDevice, DeviceLock, DevicePosition, FlashMode, FocusPoint, PhotoSettings, SurfaceHandle,
};
use crate::models::config::QualityTier;
use crate::models::error::GalleryError;
use crate::models::state::CaptureSessionState;
use crate::session::pipeline;
use crate::traits::capture_delegate::CaptureSessionDelegate;
use crate::traits::capture_hardware::CaptureHardware;
use crate::traits::persistence_writer::PersistenceWriter;

/// Completion for a capture request. Invoked exactly once per request.
pub type CaptureCompletion = Box<dyn FnOnce(Result<AssetHandle, GalleryError>) + Send + 'static>;

/// Completion for a device switch, with the newly active device.
pub type SwitchCompletion = Box<dyn FnOnce(Result<CaptureDevice, GalleryError>) + Send + 'static>;

/// The single in-flight capture request.
struct PendingCapture {
    id: Uuid,
    requested_at: DateTime<Utc>,
    completion: CaptureCompletion,
}

/// Internal mutable session state, protected by `parking_lot::Mutex`.
struct SessionCore {
    state: CaptureSessionState,
    devices: Vec<CaptureDevice>,
    active: Option<CaptureDevice>,
    device_lock: DeviceLock,
    requested_preset: QualityTier,
    applied_preset: Option<QualityTier>,
    flash: FlashMode,
    pending: Option<PendingCapture>,
}

struct ManagerInner<H: CaptureHardware> {
    hardware: H,
    writer: Arc<dyn PersistenceWriter>,
    core: Mutex<SessionCore>,
    delegate: Mutex<Option<Arc<dyn CaptureSessionDelegate>>>,
}

/// Owns the camera session and coordinates capture.
///
/// Session operations (start, stop, switch, preset, focus) run in order on a
/// serial session thread. Captured photos are decoded and persisted on a
/// separate write thread, so slow storage never blocks the session.
///
/// ```text
/// capture() → [hardware] → callback → [write thread: decode → persist] → completion
/// ```
///
/// At most one capture is pending; a second request fails immediately with
/// `CaptureInProgress` instead of queuing.
pub struct CaptureSessionManager<H: CaptureHardware + 'static> {
    inner: Arc<ManagerInner<H>>,
    session_queue: SerialQueue,
    write_queue: Arc<SerialQueue>,
}

impl<H: CaptureHardware + 'static> CaptureSessionManager<H> {
    pub fn new(
        hardware: H,
        writer: Arc<dyn PersistenceWriter>,
        preset: QualityTier,
    ) -> Result<Self, GalleryError> {
        Ok(Self {
            inner: Arc::new(ManagerInner {
                hardware,
                writer,
                core: Mutex::new(SessionCore {
                    state: CaptureSessionState::Idle,
                    devices: Vec::new(),
                    active: None,
                    device_lock: DeviceLock::Free,
                    requested_preset: preset,
                    applied_preset: None,
                    flash: FlashMode::Off,
                    pending: None,
                }),
                delegate: Mutex::new(None),
            }),
            session_queue: SerialQueue::new("camera-session")?,
            write_queue: Arc::new(SerialQueue::new("camera-write")?),
        })
    }

    pub fn set_delegate(&self, delegate: Arc<dyn CaptureSessionDelegate>) {
        *self.inner.delegate.lock() = Some(delegate);
    }

    pub fn hardware(&self) -> &H {
        &self.inner.hardware
    }

    pub fn state(&self) -> CaptureSessionState {
        self.inner.core.lock().state
    }

    pub fn active_device(&self) -> Option<CaptureDevice> {
        self.inner.core.lock().active.clone()
    }

    pub fn device_lock(&self) -> DeviceLock {
        self.inner.core.lock().device_lock
    }

    /// The preset actually applied to the session, if any.
    pub fn current_preset(&self) -> Option<QualityTier> {
        self.inner.core.lock().applied_preset
    }

    pub fn flash_mode(&self) -> FlashMode {
        self.inner.core.lock().flash
    }

    pub fn has_pending_capture(&self) -> bool {
        self.inner.core.lock().pending.is_some()
    }

    /// When the pending capture was requested.
    pub fn pending_since(&self) -> Option<DateTime<Utc>> {
        self.inner.core.lock().pending.as_ref().map(|p| p.requested_at)
    }

    pub fn is_authorized(&self) -> bool {
        self.inner.hardware.is_authorized()
    }

    /// Block until all queued session and write work has run.
    pub fn sync(&self) {
        self.session_queue.sync();
        self.write_queue.sync();
    }

    /// Check authorization and start the session.
    ///
    /// Without authorization, reports `Unauthorized` to the delegate once and
    /// stays idle. Call again after the host's permission flow succeeds.
    pub fn setup(&self) -> Result<(), GalleryError> {
        if !self.inner.hardware.is_authorized() {
            log::warn!("camera not authorized");
            self.inner.notify_unavailable(&GalleryError::Unauthorized);
            return Err(GalleryError::Unauthorized);
        }
        self.start();
        Ok(())
    }

    /// Bind the back camera and the photo output, then start running.
    /// Runs on the session thread; the delegate hears `on_started`.
    pub fn start(&self) {
        let inner = Arc::clone(&self.inner);
        self.session_queue.dispatch(move || inner.start_session());
    }

    /// Halt the session. Valid from any state and idempotent.
    ///
    /// A pending capture is not cancelled; it still resolves through its
    /// completion when the hardware reports back.
    pub fn stop(&self) {
        let inner = Arc::clone(&self.inner);
        self.session_queue.dispatch(move || inner.stop_session());
    }

    /// Swap between front and back cameras. Only valid while running.
    ///
    /// If the other camera does not exist the session is left untouched and
    /// the completion receives `DeviceUnavailable`.
    pub fn switch_device(&self, completion: SwitchCompletion) {
        let state = self.state();
        if !state.is_running() {
            log::debug!("rejecting device switch while {}", state);
            completion(Err(GalleryError::InvalidState(format!(
                "cannot switch device while {}",
                state
            ))));
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.session_queue.dispatch(move || inner.switch_session(completion));
    }

    /// Request a preset. Applied only if the active device supports it;
    /// otherwise the current preset stays.
    ///
    /// The change happens inside a configuration bracket while `Running`.
    /// Requested while idle or capturing, the preset is applied at the next
    /// device bind instead.
    pub fn configure_preset(&self, preset: QualityTier) {
        self.inner.core.lock().requested_preset = preset;
        let inner = Arc::clone(&self.inner);
        self.session_queue.dispatch(move || inner.reconfigure_preset(preset));
    }

    /// Set the focus point of interest. No-op if the device cannot lock focus.
    pub fn focus(&self, point: FocusPoint) {
        let Some(device) = self.active_device() else {
            return;
        };
        if !self.inner.hardware.supports_focus_lock(&device) {
            log::debug!("{} does not support focus lock", device.name);
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.session_queue.dispatch(move || {
            inner.with_device_lock(|hardware, device| hardware.set_focus_point(device, point));
        });
    }

    /// Choose the flash mode for subsequent captures. Returns false (and keeps
    /// the current mode) if the device does not support `mode`.
    pub fn flash(&self, mode: FlashMode) -> bool {
        let Some(device) = self.active_device() else {
            return false;
        };
        if !self.inner.hardware.supports_flash(&device, mode) {
            log::debug!("{} does not support flash {:?}", device.name, mode);
            return false;
        }
        self.inner.core.lock().flash = mode;
        true
    }

    /// Capture a photo and persist it.
    ///
    /// `completion` runs exactly once: immediately with `CaptureInProgress`
    /// or `InvalidState` if the request is rejected, otherwise with the new
    /// asset or the capture/persistence failure.
    pub fn capture(&self, surface: SurfaceHandle, completion: CaptureCompletion) {
        let (id, settings) = {
            let mut core = self.inner.core.lock();
            if core.pending.is_some() {
                drop(core);
                log::debug!("rejecting capture: another capture is pending");
                completion(Err(GalleryError::CaptureInProgress));
                return;
            }
            if !core.state.is_running() {
                let state = core.state;
                drop(core);
                completion(Err(GalleryError::InvalidState(format!(
                    "cannot capture while {}",
                    state
                ))));
                return;
            }

            let id = Uuid::new_v4();
            core.state = CaptureSessionState::Capturing;
            core.pending = Some(PendingCapture {
                id,
                requested_at: Utc::now(),
                completion,
            });
            (
                id,
                PhotoSettings {
                    surface,
                    flash: core.flash,
                },
            )
        };
        self.inner.notify_state(CaptureSessionState::Capturing);
        log::debug!("capture {} requested", id);

        let inner = Arc::clone(&self.inner);
        let write_queue = Arc::clone(&self.write_queue);
        self.inner.hardware.capture_photo(
            settings,
            Box::new(move |result| match result {
                Ok(data) => {
                    let writer_inner = Arc::clone(&inner);
                    write_queue.dispatch(move || {
                        let outcome = pipeline::run(writer_inner.writer.as_ref(), data);
                        writer_inner.finish_capture(id, outcome);
                    });
                }
                Err(e) => {
                    let error = match e {
                        GalleryError::CaptureFailed(_) => e,
                        other => GalleryError::CaptureFailed(other.to_string()),
                    };
                    inner.finish_capture(id, Err(error));
                }
            }),
        );
    }
}

impl<H: CaptureHardware + 'static> Drop for CaptureSessionManager<H> {
    fn drop(&mut self) {
        // Queued work drains when the queues drop right after this.
        self.stop();
    }
}

impl<H: CaptureHardware> ManagerInner<H> {
    fn delegate(&self) -> Option<Arc<dyn CaptureSessionDelegate>> {
        self.delegate.lock().clone()
    }

    fn set_state(&self, state: CaptureSessionState) {
        self.core.lock().state = state;
        self.notify_state(state);
    }

    fn notify_state(&self, state: CaptureSessionState) {
        log::debug!("camera session {}", state);
        if let Some(delegate) = self.delegate() {
            delegate.on_state_changed(state);
        }
    }

    fn notify_unavailable(&self, error: &GalleryError) {
        if let Some(delegate) = self.delegate() {
            delegate.on_unavailable(error);
        }
    }

    fn start_session(&self) {
        {
            let mut core = self.core.lock();
            if !core.state.is_idle() {
                log::debug!("session already {}, ignoring start", core.state);
                return;
            }
            core.devices = self.hardware.devices();
        }

        let back = self
            .core
            .lock()
            .devices
            .iter()
            .find(|d| d.position == DevicePosition::Back)
            .cloned();
        let Some(back) = back else {
            log::warn!("no back camera available");
            self.notify_unavailable(&GalleryError::DeviceUnavailable);
            return;
        };

        self.set_state(CaptureSessionState::Configuring);
        self.hardware.begin_configuration();
        let bound = self
            .bind_input(&back)
            .and_then(|_| self.hardware.add_photo_output());
        self.hardware.commit_configuration();

        if let Err(e) = bound {
            log::error!("failed to configure camera session: {}", e);
            self.core.lock().active = None;
            self.set_state(CaptureSessionState::Idle);
            self.notify_unavailable(&e);
            return;
        }

        self.notify_device_changed(&back);
        self.hardware.start_running();
        self.set_state(CaptureSessionState::Running);
        log::info!("camera session started on {}", back.name);
        if let Some(delegate) = self.delegate() {
            delegate.on_started();
        }
    }

    fn stop_session(&self) {
        let active = {
            let mut core = self.core.lock();
            if core.state.is_idle() {
                return;
            }
            // Leave Running before teardown so capture() rejects from here on.
            core.state = CaptureSessionState::Configuring;
            core.active.take()
        };
        self.notify_state(CaptureSessionState::Configuring);

        self.hardware.stop_running();
        if let Some(device) = &active {
            self.hardware.begin_configuration();
            self.hardware.remove_input(device);
            self.hardware.commit_configuration();
        }
        self.core.lock().device_lock = DeviceLock::Free;
        self.set_state(CaptureSessionState::Idle);
        log::info!("camera session stopped");
    }

    fn reconfigure_preset(&self, preset: QualityTier) {
        let device = {
            let mut core = self.core.lock();
            if !core.state.is_running() {
                log::debug!("deferring {:?} preset while {}", preset, core.state);
                return;
            }
            let Some(device) = core.active.clone() else {
                return;
            };
            core.state = CaptureSessionState::Configuring;
            device
        };
        self.notify_state(CaptureSessionState::Configuring);

        self.hardware.begin_configuration();
        self.apply_preset(&device, preset);
        self.hardware.commit_configuration();

        self.set_state(CaptureSessionState::Running);
    }

    fn switch_session(&self, completion: SwitchCompletion) {
        let (current, target) = {
            let mut core = self.core.lock();
            if !core.state.is_running() {
                let state = core.state;
                drop(core);
                completion(Err(GalleryError::InvalidState(format!(
                    "cannot switch device while {}",
                    state
                ))));
                return;
            }
            let Some(current) = core.active.clone() else {
                drop(core);
                completion(Err(GalleryError::DeviceUnavailable));
                return;
            };
            let target = core
                .devices
                .iter()
                .find(|d| d.position == current.position.opposite())
                .cloned();
            let Some(target) = target else {
                drop(core);
                log::debug!("no {:?} camera to switch to", current.position.opposite());
                completion(Err(GalleryError::DeviceUnavailable));
                return;
            };
            // Entering configuration under the same lock keeps capture out.
            core.state = CaptureSessionState::Configuring;
            (current, target)
        };
        self.notify_state(CaptureSessionState::Configuring);

        self.hardware.begin_configuration();
        self.hardware.remove_input(&current);
        let bound = self.bind_input(&target);
        let restored = match &bound {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to switch to {}: {}", target.name, e);
                // Put the previous camera back so the session stays usable.
                self.bind_input(&current).is_ok()
            }
        };
        self.hardware.commit_configuration();

        match bound {
            Ok(()) => {
                self.notify_device_changed(&target);
                self.set_state(CaptureSessionState::Running);
                completion(Ok(target));
            }
            Err(e) if restored => {
                self.set_state(CaptureSessionState::Running);
                completion(Err(e));
            }
            Err(e) => {
                log::error!("no camera bound after failed switch, stopping session");
                self.hardware.stop_running();
                {
                    let mut core = self.core.lock();
                    core.active = None;
                    core.device_lock = DeviceLock::Free;
                }
                self.set_state(CaptureSessionState::Idle);
                self.notify_unavailable(&e);
                completion(Err(e));
            }
        }
    }

    /// Apply the configured preset to `device`, then bind it as input.
    /// Must be called inside a configuration bracket. Callers announce the
    /// device change themselves once the bracket is committed.
    fn bind_input(&self, device: &CaptureDevice) -> Result<(), GalleryError> {
        let preset = self.core.lock().requested_preset;
        self.apply_preset(device, preset);
        self.hardware.add_input(device)?;
        let mut core = self.core.lock();
        core.active = Some(device.clone());
        core.device_lock = DeviceLock::Free;
        Ok(())
    }

    fn notify_device_changed(&self, device: &CaptureDevice) {
        if let Some(delegate) = self.delegate() {
            delegate.on_device_changed(device);
        }
    }

    fn apply_preset(&self, device: &CaptureDevice, preset: QualityTier) -> bool {
        if !self.hardware.supports_preset(device, preset) {
            log::debug!("{} does not support {:?}, keeping current preset", device.name, preset);
            return false;
        }
        self.hardware.set_preset(preset);
        self.core.lock().applied_preset = Some(preset);
        true
    }

    /// Run `block` with the active device locked for configuration.
    /// Skipped if there is no device or the lock cannot be taken.
    fn with_device_lock<F>(&self, block: F)
    where
        F: FnOnce(&H, &CaptureDevice),
    {
        let Some(device) = self.core.lock().active.clone() else {
            return;
        };
        if let Err(e) = self.hardware.lock_for_configuration(&device) {
            log::debug!("could not lock {}: {}", device.name, e);
            return;
        }
        self.core.lock().device_lock = DeviceLock::LockedForConfiguration;
        block(&self.hardware, &device);
        self.hardware.unlock_for_configuration(&device);
        self.core.lock().device_lock = DeviceLock::Free;
    }

    fn finish_capture(&self, id: Uuid, outcome: Result<AssetHandle, GalleryError>) {
        let (pending, returned_to_running) = {
            let mut core = self.core.lock();
            if core.pending.as_ref().map(|p| p.id) != Some(id) {
                log::warn!("ignoring completion for unknown capture {}", id);
                return;
            }
            let pending = core.pending.take();
            let returned = core.state.is_capturing();
            if returned {
                core.state = CaptureSessionState::Running;
            }
            (pending, returned)
        };

        if returned_to_running {
            self.notify_state(CaptureSessionState::Running);
        }
        match &outcome {
            Ok(asset) => log::info!("capture {} saved as {}", id, asset.id),
            Err(e) => log::warn!("capture {} failed: {}", id, e),
        }
        if let Some(pending) = pending {
            (pending.completion)(outcome);
        }
    }
}
