use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::asset_models::{AssetData, AssetHandle};
use crate::models::config::QualityTier;
use crate::models::error::GalleryError;
use crate::traits::asset_resolver::AssetResolver;

type ResolveResult = Result<AssetData, GalleryError>;
type JoinCompletion = Box<dyn FnOnce(Vec<ResolveResult>) + Send + 'static>;

/// Join point for one fan-out: counts outstanding resolutions and keeps each
/// result in its input slot.
struct JoinState {
    remaining: usize,
    slots: Vec<Option<ResolveResult>>,
    completion: Option<JoinCompletion>,
}

/// Resolve every asset concurrently and invoke `completion` once, after the
/// last resolution finishes, with results in input order.
pub fn fan_out_join<F>(
    resolver: &dyn AssetResolver,
    assets: &[AssetHandle],
    tier: QualityTier,
    completion: F,
)
where
    F: FnOnce(Vec<ResolveResult>) + Send + 'static,
{
    if assets.is_empty() {
        completion(Vec::new());
        return;
    }

    let join = Arc::new(Mutex::new(JoinState {
        remaining: assets.len(),
        slots: (0..assets.len()).map(|_| None).collect(),
        completion: Some(Box::new(completion)),
    }));

    for (index, asset) in assets.iter().enumerate() {
        let join = Arc::clone(&join);
        resolver.resolve(
            asset,
            tier,
            Box::new(move |result| {
                let finished = {
                    let mut state = join.lock();
                    if state.slots[index].is_some() {
                        log::warn!("resolver completed slot {} twice, ignoring", index);
                        return;
                    }
                    state.slots[index] = Some(result);
                    state.remaining -= 1;
                    if state.remaining > 0 {
                        None
                    } else {
                        let slots = std::mem::take(&mut state.slots);
                        state.completion.take().map(|completion| (completion, slots))
                    }
                };

                // Invoke outside the lock; the completion may start another fan-out.
                if let Some((completion, slots)) = finished {
                    completion(slots.into_iter().flatten().collect());
                }
            }),
        );
    }
}

/// Resolve a batch of assets, keeping input order and omitting failures.
pub fn resolve_batch<F>(
    resolver: &dyn AssetResolver,
    assets: &[AssetHandle],
    tier: QualityTier,
    completion: F,
)
where
    F: FnOnce(Vec<AssetData>) + Send + 'static,
{
    let ids: Vec<_> = assets.iter().map(|a| a.id.clone()).collect();
    fan_out_join(resolver, assets, tier, move |results| {
        let resolved = results
            .into_iter()
            .zip(ids)
            .filter_map(|(result, id)| match result {
                Ok(data) => Some(data),
                Err(e) => {
                    log::debug!("omitting {} from batch: {}", id, e);
                    None
                }
            })
            .collect();
        completion(resolved);
    });
}
