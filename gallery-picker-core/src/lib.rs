//! # gallery-picker-core
//!
//! Platform-agnostic selection state and capture coordination for a gallery
//! picker.
//!
//! Tracks the ordered multi-selection, fans changes out to observers, keeps a
//! latest-wins aggregate size of the selection, and drives a camera session
//! whose captures are persisted and appended to the selection. Platform
//! backends implement `CaptureHardware`, `AssetResolver` and
//! `PersistenceWriter`, and plug into the generic `CaptureSessionManager` and
//! `PickerSession`.
//!
//! ## Architecture
//!
//! ```text
//! gallery-picker-core (this crate)
//! ├── traits/     ← resolver, hardware, writer, observer and delegate traits
//! ├── models/     ← GalleryError, session state, configuration, asset types
//! ├── dispatch/   ← SerialQueue (named worker thread, FIFO jobs)
//! ├── resolve/    ← fan-out/join over asset resolution
//! ├── selection/  ← SelectionStore, ObserverRegistry, SizeAggregator
//! └── session/    ← CaptureSessionManager, capture pipeline, PickerSession
//! ```

pub mod dispatch;
pub mod models;
pub mod resolve;
pub mod selection;
pub mod session;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types at crate root for convenience.
pub use dispatch::serial_queue::SerialQueue;
pub use models::asset_models::{
    bytes_to_mb, target_size, AssetData, AssetHandle, AssetId, SelectionItem, VideoSelection,
    BYTES_PER_MB,
};
pub use models::capture_models::{
    CaptureDevice, CapturedPhoto, DeviceLock, DevicePosition, FlashMode, FocusPoint, PhotoSettings,
    SurfaceHandle,
};
pub use models::config::{GalleryTab, PickerConfiguration, QualityTier};
pub use models::error::GalleryError;
pub use models::state::CaptureSessionState;
pub use resolve::batch::{fan_out_join, resolve_batch};
pub use selection::aggregator::{AggregateSize, SizeAggregator, SizeSink};
pub use selection::observers::{ObserverId, ObserverRegistry};
pub use selection::store::{SelectionSnapshot, SelectionStore};
pub use session::capture_manager::{CaptureCompletion, CaptureSessionManager, SwitchCompletion};
pub use session::picker::{CapturedItemCompletion, PickerSession};
pub use traits::asset_resolver::{AssetResolver, ResolveCallback};
pub use traits::capture_delegate::CaptureSessionDelegate;
pub use traits::capture_hardware::{CaptureHardware, PhotoCallback};
pub use traits::persistence_writer::PersistenceWriter;
pub use traits::picker_delegate::PickerDelegate;
pub use traits::selection_observer::SelectionObserver;
