use std::sync::Arc;

use crate::models::asset_models::SelectionItem;
use crate::models::capture_models::SurfaceHandle;
use crate::models::config::{GalleryTab, PickerConfiguration};
use crate::models::error::GalleryError;
use crate::selection::store::SelectionStore;
use crate::session::capture_manager::CaptureSessionManager;
use crate::traits::asset_resolver::AssetResolver;
use crate::traits::capture_hardware::CaptureHardware;
use crate::traits::persistence_writer::PersistenceWriter;
use crate::traits::picker_delegate::PickerDelegate;

/// Completion for a capture that lands in the selection.
pub type CapturedItemCompletion =
    Box<dyn FnOnce(Result<SelectionItem, GalleryError>) + Send + 'static>;

/// One picker session: the selection, the camera, and the host delegate,
/// created together and torn down together by `end`.
///
/// Wires the capture pipeline's last stage (new asset → selection add) and
/// turns aggregate size updates into over-limit reports.
pub struct PickerSession<H: CaptureHardware + 'static> {
    config: PickerConfiguration,
    store: Arc<SelectionStore>,
    camera: CaptureSessionManager<H>,
    delegate: Arc<dyn PickerDelegate>,
}

impl<H: CaptureHardware + 'static> PickerSession<H> {
    pub fn new(
        config: PickerConfiguration,
        resolver: Arc<dyn AssetResolver>,
        hardware: H,
        writer: Arc<dyn PersistenceWriter>,
        delegate: Arc<dyn PickerDelegate>,
    ) -> Result<Self, GalleryError> {
        config.validate().map_err(GalleryError::ConfigurationFailed)?;

        let store = Arc::new(SelectionStore::new(resolver, &config));
        let size_delegate = Arc::clone(&delegate);
        let size_limit_mb = config.size_limit_mb;
        store.set_size_sink(Arc::new(move |size_mb| {
            size_delegate.on_size_changed(size_mb, size_mb > size_limit_mb);
        }));

        let camera = CaptureSessionManager::new(hardware, writer, config.quality)?;

        Ok(Self {
            config,
            store,
            camera,
            delegate,
        })
    }

    pub fn config(&self) -> &PickerConfiguration {
        &self.config
    }

    pub fn store(&self) -> &Arc<SelectionStore> {
        &self.store
    }

    pub fn camera(&self) -> &CaptureSessionManager<H> {
        &self.camera
    }

    /// Configured tabs, minus the camera when it is not authorized.
    pub fn visible_tabs(&self) -> Vec<GalleryTab> {
        let camera_available = self.camera.is_authorized();
        self.config
            .tabs
            .iter()
            .copied()
            .filter(|tab| *tab != GalleryTab::Camera || camera_available)
            .collect()
    }

    /// The configured initial tab if visible, else the first visible tab.
    pub fn initial_tab(&self) -> Option<GalleryTab> {
        let tabs = self.visible_tabs();
        if tabs.contains(&self.config.initial_tab) {
            Some(self.config.initial_tab)
        } else {
            tabs.first().copied()
        }
    }

    /// Start the camera if authorized.
    pub fn start_camera(&self) -> Result<(), GalleryError> {
        self.camera.setup()
    }

    /// Grid tap: with nothing selected, pick `item` and finish; otherwise
    /// toggle it in the multi-selection.
    pub fn select(&self, item: SelectionItem) -> Result<(), GalleryError> {
        if self.store.is_empty() {
            self.store.add(item, false)?;
            self.done_with_images();
        } else {
            self.store.toggle(item)?;
        }
        Ok(())
    }

    /// Toggle `item` in the selection. Returns whether it is now selected.
    pub fn toggle(&self, item: SelectionItem) -> Result<bool, GalleryError> {
        self.store.toggle(item)
    }

    /// Capture a photo and add it to the selection.
    ///
    /// Rejected up front with `SelectionLimitReached` when the selection is
    /// full. If the selection fills while the photo is being written, the
    /// asset stays in the library and `completion` gets the add error.
    /// `completion` runs exactly once.
    pub fn capture(&self, surface: SurfaceHandle, completion: CapturedItemCompletion) {
        if self.store.is_count_limit_reached() {
            completion(Err(GalleryError::SelectionLimitReached {
                limit: self.config.item_limit,
            }));
            return;
        }

        let store = Arc::clone(&self.store);
        let delegate = Arc::clone(&self.delegate);
        self.camera.capture(
            surface,
            Box::new(move |result| {
                let outcome = result.and_then(|asset| {
                    let item = SelectionItem::new(asset);
                    if let Err(e) = store.add(item.clone(), true) {
                        log::warn!(
                            "captured asset {} kept in library, not selected: {}",
                            item.id(),
                            e
                        );
                        return Err(e);
                    }
                    Ok(item)
                });
                if outcome.is_ok() {
                    delegate.did_capture(&store.items());
                }
                completion(outcome);
            }),
        );
    }

    /// Preview one item. The selection can be rolled back with
    /// `finish_preview(false)`.
    pub fn preview(&self, item: SelectionItem) {
        self.store.snapshot_for_restore();
        self.delegate.request_lightbox(&[item]);
    }

    /// Preview the whole selection.
    pub fn preview_selection(&self) {
        self.store.snapshot_for_restore();
        self.delegate.request_lightbox(&self.store.items());
    }

    /// Leave a preview, keeping or discarding changes made during it.
    pub fn finish_preview(&self, keep: bool) {
        if keep {
            self.store.discard_restore_point();
        } else {
            self.store.restore_snapshot();
        }
    }

    pub fn done_with_images(&self) {
        self.delegate.did_select_images(&self.store.items());
    }

    pub fn done_with_video(&self) {
        if let Some(video) = self.store.video() {
            self.delegate.did_select_video(&video);
        }
    }

    pub fn cancel(&self) {
        self.delegate.did_cancel();
    }

    /// Tear down: stop the camera, wait for queued camera work, and reset
    /// the selection (dropping every observer).
    pub fn end(&self) {
        self.camera.stop();
        self.camera.sync();
        self.store.reset();
    }
}
