use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

use crate::models::asset_models::{bytes_to_mb, AssetHandle, SelectionItem};
use crate::models::config::QualityTier;
use crate::resolve::batch::fan_out_join;
use crate::traits::asset_resolver::AssetResolver;

/// Receives the aggregate selection size in megabytes.
pub type SizeSink = Arc<dyn Fn(f64) + Send + Sync + 'static>;

/// An applied aggregate and the selection revision it was computed for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateSize {
    pub revision: u64,
    pub size_mb: f64,
}

struct Progress {
    latest_requested: u64,
    applied: AggregateSize,
}

struct Shared {
    progress: Mutex<Progress>,
    // Serializes delivery so sink calls happen in revision order. Reentrant
    // because a sink may mutate the selection, which can complete a new
    // aggregation synchronously on the same thread.
    delivery: ReentrantMutex<()>,
    sink: Mutex<Option<SizeSink>>,
}

/// Computes the total byte size of a selection by resolving every item
/// concurrently and summing the results.
///
/// Latest request wins: a completed aggregation is applied only if no newer
/// revision was requested meanwhile. Items that fail to resolve count as 0.
pub struct SizeAggregator {
    resolver: Arc<dyn AssetResolver>,
    tier: QualityTier,
    shared: Arc<Shared>,
}

impl SizeAggregator {
    pub fn new(resolver: Arc<dyn AssetResolver>, tier: QualityTier) -> Self {
        Self {
            resolver,
            tier,
            shared: Arc::new(Shared {
                progress: Mutex::new(Progress {
                    latest_requested: 0,
                    applied: AggregateSize {
                        revision: 0,
                        size_mb: 0.0,
                    },
                }),
                delivery: ReentrantMutex::new(()),
                sink: Mutex::new(None),
            }),
        }
    }

    pub fn set_sink(&self, sink: SizeSink) {
        *self.shared.sink.lock() = Some(sink);
    }

    /// The most recently applied aggregate.
    pub fn current(&self) -> AggregateSize {
        self.shared.progress.lock().applied
    }

    pub fn latest_requested(&self) -> u64 {
        self.shared.progress.lock().latest_requested
    }

    /// Whether an aggregation for the latest requested revision is in flight.
    pub fn is_pending(&self) -> bool {
        let progress = self.shared.progress.lock();
        progress.applied.revision < progress.latest_requested
    }

    /// Start aggregating `items`, the selection at `revision`.
    ///
    /// Requests for a revision at or below one already requested are ignored.
    pub fn recompute(&self, revision: u64, items: &[SelectionItem]) {
        {
            let mut progress = self.shared.progress.lock();
            if revision <= progress.latest_requested {
                log::debug!(
                    "ignoring aggregate request for revision {} (latest {})",
                    revision,
                    progress.latest_requested
                );
                return;
            }
            progress.latest_requested = revision;
        }

        let assets: Vec<AssetHandle> = items.iter().map(|item| item.asset().clone()).collect();
        let shared = Arc::clone(&self.shared);

        fan_out_join(self.resolver.as_ref(), &assets, self.tier, move |results| {
            let total_bytes: u64 = results
                .iter()
                .map(|result| match result {
                    Ok(data) => data.byte_size(),
                    Err(e) => {
                        log::debug!("counting unresolved item as 0 bytes: {}", e);
                        0
                    }
                })
                .sum();
            shared.deliver(revision, bytes_to_mb(total_bytes));
        });
    }
}

impl Shared {
    fn deliver(&self, revision: u64, size_mb: f64) {
        let _delivery = self.delivery.lock();

        let sink = {
            let mut progress = self.progress.lock();
            if revision != progress.latest_requested || revision <= progress.applied.revision {
                log::debug!(
                    "discarding stale aggregate for revision {} (latest {})",
                    revision,
                    progress.latest_requested
                );
                return;
            }
            progress.applied = AggregateSize { revision, size_mb };
            self.sink.lock().clone()
        };

        log::debug!("selection revision {} totals {:.2} MB", revision, size_mb);
        if let Some(sink) = sink {
            sink(size_mb);
        }
    }
}
