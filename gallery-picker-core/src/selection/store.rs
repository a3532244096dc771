use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

use crate::models::asset_models::{AssetId, SelectionItem, VideoSelection};
use crate::models::config::PickerConfiguration;
use crate::models::error::GalleryError;
use crate::selection::aggregator::{SizeAggregator, SizeSink};
use crate::selection::observers::{ObserverId, ObserverRegistry};
use crate::traits::asset_resolver::AssetResolver;
use crate::traits::selection_observer::SelectionObserver;

/// Immutable copy of the selection at one revision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub revision: u64,
    pub items: Vec<SelectionItem>,
    pub video: Option<VideoSelection>,
}

impl SelectionSnapshot {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.video.is_none()
    }

    pub fn contains(&self, item: &SelectionItem) -> bool {
        self.items.contains(item)
    }
}

/// Saved selection for a single level of undo.
struct RestorePoint {
    items: Vec<SelectionItem>,
    video: Option<VideoSelection>,
}

struct SelectionState {
    revision: u64,
    items: Vec<SelectionItem>,
    video: Option<VideoSelection>,
    restore_point: Option<RestorePoint>,
}

impl SelectionState {
    /// Record a mutation and return the resulting snapshot.
    fn commit(&mut self) -> SelectionSnapshot {
        self.revision += 1;
        self.snapshot()
    }

    fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            revision: self.revision,
            items: self.items.clone(),
            video: self.video.clone(),
        }
    }
}

/// The authoritative, ordered selection for one picker session.
///
/// Every mutation fans out to observers synchronously, before returning, and
/// then starts an aggregate size recompute whose result arrives through the
/// size sink strictly after that fan-out.
///
/// Observers run without the state lock held and may call back into the store.
/// Mutations from different threads are serialized: a mutation's fan-out
/// completes before another thread's mutation is accepted.
pub struct SelectionStore {
    config: PickerConfiguration,
    state: Mutex<SelectionState>,
    // Held across commit and fan-out. Reentrant so observers can mutate the
    // store from inside a callback.
    mutation: ReentrantMutex<()>,
    observers: ObserverRegistry,
    aggregator: SizeAggregator,
}

impl SelectionStore {
    pub fn new(resolver: Arc<dyn AssetResolver>, config: &PickerConfiguration) -> Self {
        Self {
            config: config.clone(),
            state: Mutex::new(SelectionState {
                revision: 0,
                items: Vec::new(),
                video: None,
                restore_point: None,
            }),
            mutation: ReentrantMutex::new(()),
            observers: ObserverRegistry::new(),
            aggregator: SizeAggregator::new(resolver, config.quality),
        }
    }

    // --- Observers ---

    pub fn register(&self, observer: Arc<dyn SelectionObserver>) -> ObserverId {
        self.observers.register(observer)
    }

    pub fn unregister(&self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Install the callback that receives each applied aggregate size.
    pub fn set_size_sink(&self, sink: SizeSink) {
        self.aggregator.set_sink(sink);
    }

    // --- Reads ---

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.state.lock().snapshot()
    }

    pub fn items(&self) -> Vec<SelectionItem> {
        self.state.lock().items.clone()
    }

    pub fn video(&self) -> Option<VideoSelection> {
        self.state.lock().video.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn contains(&self, item: &SelectionItem) -> bool {
        self.state.lock().items.contains(item)
    }

    pub fn revision(&self) -> u64 {
        self.state.lock().revision
    }

    /// Latest applied aggregate size, in megabytes.
    pub fn aggregate_size_mb(&self) -> f64 {
        self.aggregator.current().size_mb
    }

    /// Whether an aggregate for the current selection is still being computed.
    pub fn is_aggregate_pending(&self) -> bool {
        self.aggregator.is_pending()
    }

    pub fn is_count_limit_reached(&self) -> bool {
        self.config.is_count_limit_reached(self.len())
    }

    pub fn is_size_limit_exceeded(&self) -> bool {
        self.aggregate_size_mb() > self.config.size_limit_mb
    }

    // --- Mutations ---

    /// Append `item` unless it is already selected.
    ///
    /// Returns `Ok(false)` for a duplicate and `SelectionLimitReached` when
    /// the item limit is met; neither changes state or notifies observers.
    pub fn add(&self, item: SelectionItem, captured_just_now: bool) -> Result<bool, GalleryError> {
        let serial = self.mutation.lock();
        let snapshot = {
            let mut state = self.state.lock();
            if state.items.contains(&item) {
                return Ok(false);
            }
            if self.config.is_count_limit_reached(state.items.len()) {
                log::debug!("rejecting {}: limit of {} reached", item.id(), self.config.item_limit);
                return Err(GalleryError::SelectionLimitReached {
                    limit: self.config.item_limit,
                });
            }
            state.items.push(item.clone());
            state.commit()
        };

        self.observers
            .notify(|o| o.on_added(&snapshot, &item, captured_just_now));
        drop(serial);

        self.refresh_aggregate(&snapshot);
        Ok(true)
    }

    /// Remove `item` if selected. Returns whether anything changed.
    pub fn remove(&self, item: &SelectionItem) -> bool {
        let serial = self.mutation.lock();
        let (removed, snapshot) = {
            let mut state = self.state.lock();
            let Some(index) = state.items.iter().position(|i| i == item) else {
                return false;
            };
            let removed = state.items.remove(index);
            (removed, state.commit())
        };

        self.observers.notify(|o| o.on_removed(&snapshot, &removed));
        drop(serial);

        self.refresh_aggregate(&snapshot);
        true
    }

    /// Remove the item with asset id `id`, reporting a reload.
    pub fn remove_by_id(&self, id: &AssetId) -> bool {
        let serial = self.mutation.lock();
        let snapshot = {
            let mut state = self.state.lock();
            let Some(index) = state.items.iter().position(|i| i.id() == id) else {
                return false;
            };
            state.items.remove(index);
            state.commit()
        };

        self.observers.notify(|o| o.on_reloaded(&snapshot));
        drop(serial);

        self.refresh_aggregate(&snapshot);
        true
    }

    /// Remove `item` if selected, otherwise add it. Returns whether the item
    /// is selected afterwards.
    pub fn toggle(&self, item: SelectionItem) -> Result<bool, GalleryError> {
        if self.remove(&item) {
            return Ok(false);
        }
        self.add(item, false)?;
        Ok(true)
    }

    /// Swap in `items` as the whole selection. Later duplicates are dropped.
    pub fn replace_all(&self, items: Vec<SelectionItem>) {
        let mut unique: Vec<SelectionItem> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }

        let serial = self.mutation.lock();
        let snapshot = {
            let mut state = self.state.lock();
            state.items = unique;
            state.commit()
        };

        self.observers.notify(|o| o.on_reloaded(&snapshot));
        drop(serial);

        self.refresh_aggregate(&snapshot);
    }

    pub fn set_video(&self, video: Option<VideoSelection>) {
        let serial = self.mutation.lock();
        let snapshot = {
            let mut state = self.state.lock();
            state.video = video;
            state.commit()
        };

        self.observers.notify(|o| o.on_reloaded(&snapshot));
        drop(serial);

        self.refresh_aggregate(&snapshot);
    }

    /// Empty the items and the video.
    pub fn clear(&self) {
        let serial = self.mutation.lock();
        let snapshot = {
            let mut state = self.state.lock();
            state.items.clear();
            state.video = None;
            state.commit()
        };

        self.observers.notify(|o| o.on_reloaded(&snapshot));
        drop(serial);

        self.refresh_aggregate(&snapshot);
    }

    /// Session teardown: clear, then drop every observer and the restore point.
    pub fn reset(&self) {
        self.clear();
        self.observers.clear();
        self.state.lock().restore_point = None;
    }

    /// Remember the current selection so `restore_snapshot` can roll back to
    /// it. Replaces any earlier restore point.
    pub fn snapshot_for_restore(&self) {
        let mut state = self.state.lock();
        state.restore_point = Some(RestorePoint {
            items: state.items.clone(),
            video: state.video.clone(),
        });
    }

    pub fn has_restore_point(&self) -> bool {
        self.state.lock().restore_point.is_some()
    }

    /// Roll back to the saved selection, consuming it. Returns false when
    /// there is nothing to restore.
    pub fn restore_snapshot(&self) -> bool {
        let serial = self.mutation.lock();
        let snapshot = {
            let mut state = self.state.lock();
            let Some(point) = state.restore_point.take() else {
                return false;
            };
            state.items = point.items;
            state.video = point.video;
            state.commit()
        };

        self.observers.notify(|o| o.on_reloaded(&snapshot));
        drop(serial);

        self.refresh_aggregate(&snapshot);
        true
    }

    /// Forget the saved selection without applying it.
    pub fn discard_restore_point(&self) {
        self.state.lock().restore_point = None;
    }

    fn refresh_aggregate(&self, snapshot: &SelectionSnapshot) {
        self.aggregator.recompute(snapshot.revision, &snapshot.items);
    }
}
