use crate::models::asset_models::{SelectionItem, VideoSelection};

/// Host-facing picker events.
///
/// Injected into `PickerSession` at construction and dropped with it.
pub trait PickerDelegate: Send + Sync {
    fn did_cancel(&self);

    fn did_select_images(&self, items: &[SelectionItem]);

    fn did_select_video(&self, video: &VideoSelection);

    /// Show a full-screen preview of `items`.
    fn request_lightbox(&self, items: &[SelectionItem]);

    /// A freshly captured photo was added to the selection.
    fn did_capture(&self, items: &[SelectionItem]);

    /// Aggregate size of the selection changed.
    fn on_size_changed(&self, size_mb: f64, over_limit: bool);
}
