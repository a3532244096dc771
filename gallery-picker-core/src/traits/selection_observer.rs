use crate::models::asset_models::SelectionItem;
use crate::selection::store::SelectionSnapshot;

/// Listener for selection changes.
///
/// Called synchronously on the thread that performed the mutation, after the
/// mutation is applied. `snapshot` is the state right after it.
///
/// The store holds a strong reference until `unregister` is called with the
/// id returned from `register`; owners must unregister before disposal.
pub trait SelectionObserver: Send + Sync {
    fn on_added(&self, snapshot: &SelectionSnapshot, item: &SelectionItem, captured_just_now: bool);

    fn on_removed(&self, snapshot: &SelectionSnapshot, item: &SelectionItem);

    /// The selection changed wholesale (replace, clear, restore, removal by id).
    fn on_reloaded(&self, snapshot: &SelectionSnapshot);
}
