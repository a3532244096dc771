use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::traits::selection_observer::SelectionObserver;

/// Token returned by `register`, used to unregister the observer later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Clone)]
struct Entry {
    id: ObserverId,
    observer: Arc<dyn SelectionObserver>,
    active: Arc<AtomicBool>,
}

/// Registered selection observers, notified in registration order.
///
/// Fan-out iterates over a snapshot taken when it starts, so observers may
/// register or unregister from inside a callback:
/// - an observer registered during a fan-out first hears the next event;
/// - an observer unregistered during a fan-out is skipped for the rest of the
///   current event and for every later one.
pub struct ObserverRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, observer: Arc<dyn SelectionObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push(Entry {
            id,
            observer,
            active: Arc::new(AtomicBool::new(true)),
        });
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut entries = self.entries.lock();
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = entries.remove(index);
        entry.active.store(false, Ordering::Release);
        true
    }

    /// Unregister everything.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.entries.lock());
        for entry in &removed {
            entry.active.store(false, Ordering::Release);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Invoke `event` on every observer registered when the call starts.
    pub fn notify<F>(&self, event: F)
    where
        F: Fn(&dyn SelectionObserver),
    {
        let snapshot: Vec<Entry> = self.entries.lock().clone();
        for entry in snapshot {
            if entry.active.load(Ordering::Acquire) {
                event(entry.observer.as_ref());
            }
        }
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
