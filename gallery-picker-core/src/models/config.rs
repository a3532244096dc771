use serde::{Deserialize, Serialize};

/// Quality preset used both for the camera session and for asset resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Medium,
    #[default]
    High,
    Original,
}

/// Picker pages the host can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryTab {
    Images,
    Camera,
    Videos,
}

/// Configuration for a picker session. Read-only to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerConfiguration {
    /// Camera preset and resolution tier for size aggregation (default: high).
    pub quality: QualityTier,

    /// Maximum number of selected images (0 = unlimited).
    pub item_limit: usize,

    /// Aggregate selection size above which the host shows the over-limit
    /// affordance, in megabytes.
    pub size_limit_mb: f64,

    /// Tabs in display order.
    pub tabs: Vec<GalleryTab>,

    /// Tab shown first; falls back to the first visible tab.
    pub initial_tab: GalleryTab,
}

impl PickerConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if !self.size_limit_mb.is_finite() || self.size_limit_mb <= 0.0 {
            return Err(format!("size limit must be positive: {}", self.size_limit_mb));
        }
        if self.tabs.is_empty() {
            return Err("at least one tab must be shown".into());
        }
        for (i, tab) in self.tabs.iter().enumerate() {
            if self.tabs[..i].contains(tab) {
                return Err(format!("duplicate tab: {:?}", tab));
            }
        }
        Ok(())
    }

    /// Whether adding one more item would exceed the item limit.
    pub fn is_count_limit_reached(&self, count: usize) -> bool {
        self.item_limit != 0 && count >= self.item_limit
    }
}

impl Default for PickerConfiguration {
    fn default() -> Self {
        Self {
            quality: QualityTier::High,
            item_limit: 0,
            size_limit_mb: 25.0,
            tabs: vec![GalleryTab::Images, GalleryTab::Camera, GalleryTab::Videos],
            initial_tab: GalleryTab::Camera,
        }
    }
}
