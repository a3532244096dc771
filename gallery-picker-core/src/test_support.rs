//! Fakes for the collaborator traits, shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::models::asset_models::{
    target_size, AssetData, AssetHandle, AssetId, SelectionItem, VideoSelection,
};
use crate::models::capture_models::{
    CaptureDevice, CapturedPhoto, DevicePosition, FlashMode, FocusPoint, PhotoSettings,
};
use crate::models::config::QualityTier;
use crate::models::error::GalleryError;
use crate::models::state::CaptureSessionState;
use crate::selection::store::SelectionSnapshot;
use crate::traits::asset_resolver::{AssetResolver, ResolveCallback};
use crate::traits::capture_delegate::CaptureSessionDelegate;
use crate::traits::capture_hardware::{CaptureHardware, PhotoCallback};
use crate::traits::persistence_writer::PersistenceWriter;
use crate::traits::picker_delegate::PickerDelegate;
use crate::traits::selection_observer::SelectionObserver;

pub fn handle(id: &str) -> AssetHandle {
    AssetHandle::new(AssetId::new(id), 4032, 3024)
}

pub fn item(id: &str) -> SelectionItem {
    SelectionItem::new(handle(id))
}

pub fn video(id: &str) -> VideoSelection {
    VideoSelection::new(handle(id), 12.0)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn sized_data(asset: &AssetHandle, tier: QualityTier, size: u64) -> AssetData {
    let (width, height) = target_size(asset, tier);
    AssetData {
        width,
        height,
        bytes: vec![0; size as usize],
    }
}

// --- Resolvers ---

/// Completes every resolution synchronously on the calling thread.
#[derive(Default)]
pub struct ImmediateResolver {
    sizes: Mutex<HashMap<String, u64>>,
    failures: Mutex<HashSet<String>>,
    tiers: Mutex<Vec<QualityTier>>,
}

impl ImmediateResolver {
    pub fn set_size(&self, id: &str, bytes: u64) {
        self.sizes.lock().insert(id.to_string(), bytes);
    }

    pub fn fail(&self, id: &str) {
        self.failures.lock().insert(id.to_string());
    }

    pub fn requested_tiers(&self) -> Vec<QualityTier> {
        self.tiers.lock().clone()
    }
}

impl AssetResolver for ImmediateResolver {
    fn resolve(&self, asset: &AssetHandle, tier: QualityTier, completion: ResolveCallback) {
        self.tiers.lock().push(tier);
        let id = asset.id.as_str();
        if self.failures.lock().contains(id) {
            completion(Err(GalleryError::ResolutionFailed(format!("{} is unavailable", id))));
            return;
        }
        let size = self.sizes.lock().get(id).copied().unwrap_or(0);
        completion(Ok(sized_data(asset, tier, size)));
    }
}

/// Holds resolutions until the test completes them, in any order.
#[derive(Default)]
pub struct DeferredResolver {
    pending: Mutex<Vec<(AssetHandle, QualityTier, ResolveCallback)>>,
}

impl DeferredResolver {
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Complete the oldest outstanding resolution of `id`.
    pub fn complete(&self, id: &str, bytes: u64) {
        let (asset, tier, completion) = self.take(id, false);
        completion(Ok(sized_data(&asset, tier, bytes)));
    }

    /// Complete the newest outstanding resolution of `id`.
    pub fn complete_latest(&self, id: &str, bytes: u64) {
        let (asset, tier, completion) = self.take(id, true);
        completion(Ok(sized_data(&asset, tier, bytes)));
    }

    pub fn complete_failed(&self, id: &str) {
        let (_, _, completion) = self.take(id, false);
        completion(Err(GalleryError::ResolutionFailed(id.to_string())));
    }

    fn take(&self, id: &str, newest: bool) -> (AssetHandle, QualityTier, ResolveCallback) {
        let mut pending = self.pending.lock();
        let mut matches = pending
            .iter()
            .enumerate()
            .filter(|(_, (asset, _, _))| asset.id.as_str() == id)
            .map(|(index, _)| index);
        let index = if newest { matches.last() } else { matches.next() };
        let index = index.unwrap_or_else(|| panic!("no pending resolution for {}", id));
        pending.remove(index)
    }
}

impl AssetResolver for DeferredResolver {
    fn resolve(&self, asset: &AssetHandle, tier: QualityTier, completion: ResolveCallback) {
        self.pending.lock().push((asset.clone(), tier, completion));
    }
}

// --- Observers ---

#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    Added(String, bool),
    Removed(String),
    /// Item count of the reloaded snapshot.
    Reloaded(usize),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
    log: Option<Arc<Mutex<Vec<String>>>>,
    add_hook: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl RecordingObserver {
    /// Also append a line per event to a log shared with other recorders.
    pub fn with_log(log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            log: Some(log),
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().clone()
    }

    /// Run `hook` from inside the next `on_added` callback.
    pub fn on_next_add(&self, hook: impl FnOnce() + Send + 'static) {
        *self.add_hook.lock() = Some(Box::new(hook));
    }

    fn record(&self, event: ObserverEvent, line: String) {
        self.events.lock().push(event);
        if let Some(log) = &self.log {
            log.lock().push(line);
        }
    }
}

impl SelectionObserver for RecordingObserver {
    fn on_added(
        &self,
        _snapshot: &SelectionSnapshot,
        item: &SelectionItem,
        captured_just_now: bool,
    ) {
        let id = item.id().to_string();
        self.record(ObserverEvent::Added(id.clone(), captured_just_now), format!("added {}", id));
        let hook = self.add_hook.lock().take();
        if let Some(hook) = hook {
            hook();
        }
    }

    fn on_removed(&self, _snapshot: &SelectionSnapshot, item: &SelectionItem) {
        let id = item.id().to_string();
        self.record(ObserverEvent::Removed(id.clone()), format!("removed {}", id));
    }

    fn on_reloaded(&self, snapshot: &SelectionSnapshot) {
        self.record(
            ObserverEvent::Reloaded(snapshot.len()),
            format!("reloaded {}", snapshot.len()),
        );
    }
}

/// Records the revision of every snapshot it is shown. The `on_added` call for
/// one asset blocks until released, and records only after the release.
pub struct GatedObserver {
    gate_id: String,
    entered: Sender<()>,
    release: Receiver<()>,
    revisions: Mutex<Vec<u64>>,
}

impl GatedObserver {
    /// Returns the observer, a receiver signalled once the gated `on_added`
    /// has started, and the sender that lets it finish.
    pub fn new(gate_id: &str) -> (Arc<Self>, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let observer = Arc::new(Self {
            gate_id: gate_id.to_string(),
            entered: entered_tx,
            release: release_rx,
            revisions: Mutex::new(Vec::new()),
        });
        (observer, entered_rx, release_tx)
    }

    pub fn revisions(&self) -> Vec<u64> {
        self.revisions.lock().clone()
    }
}

impl SelectionObserver for GatedObserver {
    fn on_added(
        &self,
        snapshot: &SelectionSnapshot,
        item: &SelectionItem,
        _captured_just_now: bool,
    ) {
        if item.id().as_str() == self.gate_id {
            let _ = self.entered.send(());
            let _ = self.release.recv();
        }
        self.revisions.lock().push(snapshot.revision);
    }

    fn on_removed(&self, snapshot: &SelectionSnapshot, _item: &SelectionItem) {
        self.revisions.lock().push(snapshot.revision);
    }

    fn on_reloaded(&self, snapshot: &SelectionSnapshot) {
        self.revisions.lock().push(snapshot.revision);
    }
}

// --- Camera ---

pub fn camera(position: DevicePosition) -> CaptureDevice {
    let name = match position {
        DevicePosition::Front => "front",
        DevicePosition::Back => "back",
    };
    CaptureDevice {
        id: format!("{}-camera", name),
        name: format!("{} camera", name),
        position,
    }
}

struct HardwareState {
    authorized: bool,
    devices: Vec<CaptureDevice>,
    unsupported_presets: HashSet<QualityTier>,
    focus_lock: bool,
    lockable: bool,
    flash_modes: HashSet<FlashMode>,
    failing_inputs: HashSet<String>,
    inputs: Vec<CaptureDevice>,
    preset: Option<QualityTier>,
    running: bool,
    in_configuration: bool,
    focus_point: Option<FocusPoint>,
    calls: Vec<String>,
    captures: Vec<(PhotoSettings, PhotoCallback)>,
    captures_in_configuration: usize,
    pause: Option<Pause>,
}

/// Blocks the hardware inside one named call until released.
struct Pause {
    call: String,
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Scriptable camera stack. Clones share state, so a test can keep a handle
/// after giving one to the manager.
#[derive(Clone)]
pub struct FakeHardware {
    state: Arc<Mutex<HardwareState>>,
}

impl Default for FakeHardware {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(HardwareState {
                authorized: true,
                devices: vec![camera(DevicePosition::Back), camera(DevicePosition::Front)],
                unsupported_presets: HashSet::new(),
                focus_lock: true,
                lockable: true,
                flash_modes: [FlashMode::Off, FlashMode::On, FlashMode::Auto].into_iter().collect(),
                failing_inputs: HashSet::new(),
                inputs: Vec::new(),
                preset: None,
                running: false,
                in_configuration: false,
                focus_point: None,
                calls: Vec::new(),
                captures: Vec::new(),
                captures_in_configuration: 0,
                pause: None,
            })),
        }
    }
}

impl FakeHardware {
    pub fn unauthorized() -> Self {
        let hardware = Self::default();
        hardware.state.lock().authorized = false;
        hardware
    }

    pub fn with_devices(devices: Vec<CaptureDevice>) -> Self {
        let hardware = Self::default();
        hardware.state.lock().devices = devices;
        hardware
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.state.lock().authorized = authorized;
    }

    pub fn unsupport_preset(&self, preset: QualityTier) {
        self.state.lock().unsupported_presets.insert(preset);
    }

    pub fn set_focus_lock(&self, supported: bool) {
        self.state.lock().focus_lock = supported;
    }

    pub fn set_lockable(&self, lockable: bool) {
        self.state.lock().lockable = lockable;
    }

    pub fn set_flash_modes(&self, modes: &[FlashMode]) {
        self.state.lock().flash_modes = modes.iter().copied().collect();
    }

    pub fn fail_input(&self, device: &CaptureDevice) {
        self.state.lock().failing_inputs.insert(device.id.clone());
    }

    pub fn inputs(&self) -> Vec<CaptureDevice> {
        self.state.lock().inputs.clone()
    }

    pub fn preset(&self) -> Option<QualityTier> {
        self.state.lock().preset
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn focus_point(&self) -> Option<FocusPoint> {
        self.state.lock().focus_point
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Captures issued between `begin_configuration` and `commit_configuration`.
    pub fn captures_in_configuration(&self) -> usize {
        self.state.lock().captures_in_configuration
    }

    /// Block the next call logged as `call` until the returned sender fires.
    /// The receiver is signalled once the call has started.
    pub fn pause_at(&self, call: &str) -> (Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        self.state.lock().pause = Some(Pause {
            call: call.to_string(),
            entered: entered_tx,
            release: release_rx,
        });
        (entered_rx, release_tx)
    }

    pub fn pending_captures(&self) -> usize {
        self.state.lock().captures.len()
    }

    pub fn last_settings(&self) -> Option<PhotoSettings> {
        self.state.lock().captures.last().map(|(settings, _)| *settings)
    }

    /// Fire the oldest outstanding capture callback.
    pub fn finish_capture(&self, result: Result<Vec<u8>, GalleryError>) {
        let (_, callback) = self.state.lock().captures.remove(0);
        callback(result);
    }

    fn call(&self, name: impl Into<String>) {
        let name = name.into();
        let pause = {
            let mut state = self.state.lock();
            state.calls.push(name.clone());
            if state.pause.as_ref().is_some_and(|p| p.call == name) {
                state.pause.take()
            } else {
                None
            }
        };
        if let Some(pause) = pause {
            let _ = pause.entered.send(());
            let _ = pause.release.recv();
        }
    }
}

impl CaptureHardware for FakeHardware {
    fn is_authorized(&self) -> bool {
        self.state.lock().authorized
    }

    fn devices(&self) -> Vec<CaptureDevice> {
        self.state.lock().devices.clone()
    }

    fn begin_configuration(&self) {
        self.call("begin");
        self.state.lock().in_configuration = true;
    }

    fn commit_configuration(&self) {
        self.call("commit");
        self.state.lock().in_configuration = false;
    }

    fn add_input(&self, device: &CaptureDevice) -> Result<(), GalleryError> {
        self.call(format!("add {}", device.id));
        let mut state = self.state.lock();
        if state.failing_inputs.contains(&device.id) {
            return Err(GalleryError::DeviceUnavailable);
        }
        state.inputs.push(device.clone());
        Ok(())
    }

    fn remove_input(&self, device: &CaptureDevice) {
        self.call(format!("remove {}", device.id));
        self.state.lock().inputs.retain(|d| d != device);
    }

    fn add_photo_output(&self) -> Result<(), GalleryError> {
        self.call("output");
        Ok(())
    }

    fn supports_preset(&self, _device: &CaptureDevice, preset: QualityTier) -> bool {
        !self.state.lock().unsupported_presets.contains(&preset)
    }

    fn set_preset(&self, preset: QualityTier) {
        self.call(format!("preset {:?}", preset));
        self.state.lock().preset = Some(preset);
    }

    fn start_running(&self) {
        self.call("start");
        self.state.lock().running = true;
    }

    fn stop_running(&self) {
        self.call("stop");
        self.state.lock().running = false;
    }

    fn lock_for_configuration(&self, _device: &CaptureDevice) -> Result<(), GalleryError> {
        if self.state.lock().lockable {
            self.call("lock");
            Ok(())
        } else {
            Err(GalleryError::InvalidState("device busy".into()))
        }
    }

    fn unlock_for_configuration(&self, _device: &CaptureDevice) {
        self.call("unlock");
    }

    fn supports_focus_lock(&self, _device: &CaptureDevice) -> bool {
        self.state.lock().focus_lock
    }

    fn set_focus_point(&self, _device: &CaptureDevice, point: FocusPoint) {
        self.state.lock().focus_point = Some(point);
    }

    fn supports_flash(&self, _device: &CaptureDevice, mode: FlashMode) -> bool {
        self.state.lock().flash_modes.contains(&mode)
    }

    fn capture_photo(&self, settings: PhotoSettings, completion: PhotoCallback) {
        self.call("capture");
        let mut state = self.state.lock();
        if state.in_configuration {
            state.captures_in_configuration += 1;
        }
        state.captures.push((settings, completion));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    State(CaptureSessionState),
    Unavailable(GalleryError),
    Started,
    DeviceChanged(DevicePosition),
}

#[derive(Default)]
pub struct RecordingSessionDelegate {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingSessionDelegate {
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }
}

impl CaptureSessionDelegate for RecordingSessionDelegate {
    fn on_state_changed(&self, state: CaptureSessionState) {
        self.events.lock().push(SessionEvent::State(state));
    }

    fn on_unavailable(&self, error: &GalleryError) {
        self.events.lock().push(SessionEvent::Unavailable(error.clone()));
    }

    fn on_started(&self) {
        self.events.lock().push(SessionEvent::Started);
    }

    fn on_device_changed(&self, device: &CaptureDevice) {
        self.events.lock().push(SessionEvent::DeviceChanged(device.position));
    }
}

// --- Persistence ---

#[derive(Default)]
struct WriterState {
    written: Vec<CapturedPhoto>,
    fail_next: Option<GalleryError>,
    gate: Option<Receiver<()>>,
}

/// In-memory writer. Clones share state.
#[derive(Clone, Default)]
pub struct FakeWriter {
    state: Arc<Mutex<WriterState>>,
}

impl FakeWriter {
    /// A writer whose writes block until the returned sender releases them,
    /// one message per write.
    pub fn gated() -> (Self, Sender<()>) {
        let (release, gate) = crossbeam_channel::unbounded();
        let writer = Self::default();
        writer.state.lock().gate = Some(gate);
        (writer, release)
    }

    pub fn fail_next(&self, error: GalleryError) {
        self.state.lock().fail_next = Some(error);
    }

    pub fn written(&self) -> Vec<CapturedPhoto> {
        self.state.lock().written.clone()
    }
}

impl PersistenceWriter for FakeWriter {
    fn write(&self, photo: &CapturedPhoto) -> Result<AssetHandle, GalleryError> {
        let gate = self.state.lock().gate.clone();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        let mut state = self.state.lock();
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        state.written.push(photo.clone());
        Ok(AssetHandle::new(AssetId::generate(), photo.width, photo.height))
    }
}

// --- Picker ---

#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    Cancelled,
    SelectedImages(Vec<String>),
    SelectedVideo(String),
    Lightbox(Vec<String>),
    Captured(Vec<String>),
    SizeChanged(f64, bool),
}

#[derive(Default)]
pub struct RecordingPickerDelegate {
    events: Mutex<Vec<PickerEvent>>,
}

impl RecordingPickerDelegate {
    pub fn events(&self) -> Vec<PickerEvent> {
        self.events.lock().clone()
    }

    fn ids(items: &[SelectionItem]) -> Vec<String> {
        items.iter().map(|i| i.id().to_string()).collect()
    }
}

impl PickerDelegate for RecordingPickerDelegate {
    fn did_cancel(&self) {
        self.events.lock().push(PickerEvent::Cancelled);
    }

    fn did_select_images(&self, items: &[SelectionItem]) {
        self.events.lock().push(PickerEvent::SelectedImages(Self::ids(items)));
    }

    fn did_select_video(&self, video: &VideoSelection) {
        self.events.lock().push(PickerEvent::SelectedVideo(video.id().to_string()));
    }

    fn request_lightbox(&self, items: &[SelectionItem]) {
        self.events.lock().push(PickerEvent::Lightbox(Self::ids(items)));
    }

    fn did_capture(&self, items: &[SelectionItem]) {
        self.events.lock().push(PickerEvent::Captured(Self::ids(items)));
    }

    fn on_size_changed(&self, size_mb: f64, over_limit: bool) {
        self.events.lock().push(PickerEvent::SizeChanged(size_mb, over_limit));
    }
}
