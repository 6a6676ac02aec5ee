//! Progress tracking for batched asset loads
//!
//! Tracks total/loaded counts for the current preload batch and fans
//! normalized progress events out to transient listeners (loading screens,
//! test probes). Listeners are snapshotted before each notification pass so
//! they may add or remove themselves from inside a callback.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// Extensions treated as textures; everything else goes to a model decoder
const TEXTURE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "bmp", "tga", "tif", "tiff", "exr", "hdr",
];

/// Kind of resource a path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Model,
    Texture,
}

impl AssetKind {
    /// Classify a path by its extension
    pub fn from_path(path: &str) -> Self {
        let is_texture = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                TEXTURE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false);

        if is_texture {
            Self::Texture
        } else {
            Self::Model
        }
    }
}

/// Progress event emitted to registered listeners
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Path of the asset this event concerns; empty for the final batch event
    pub path: String,
    /// Percent complete (0-100) for this single asset
    pub percent: f32,
    /// Raw bytes loaded so far
    pub loaded_bytes: u64,
    /// Total bytes expected, 0 when unknown
    pub total_bytes: u64,
    /// True only for the one synthetic event closing a preload batch
    pub batch_complete: bool,
}

/// Identifier returned by [`ListenerRegistry::add`], used for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressListenerId(u64);

type Listener = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Registry of transient progress listeners
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(u64, Listener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its removal handle
    pub fn add(&self, listener: impl Fn(&ProgressEvent) + Send + Sync + 'static) -> ProgressListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().push((id, Arc::new(listener)));
        ProgressListenerId(id)
    }

    /// Remove a previously registered listener
    pub fn remove(&self, id: ProgressListenerId) {
        self.listeners.write().retain(|(lid, _)| *lid != id.0);
    }

    /// Notify all listeners registered at the start of this pass
    pub fn emit(&self, event: &ProgressEvent) {
        let snapshot: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }
}

#[derive(Default)]
struct BatchState {
    total: usize,
    loaded: usize,
    completed: HashSet<String>,
}

/// Tracks completion counts for the active preload batch
///
/// Each path is counted exactly once per batch regardless of whether it
/// loaded, failed, or was satisfied from cache, so `loaded` never exceeds
/// `total`.
#[derive(Default)]
pub struct BatchTracker {
    state: Mutex<BatchState>,
}

impl BatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset counters for a new batch of `total` unique paths
    pub fn begin(&self, total: usize) {
        let mut state = self.state.lock();
        state.total = total;
        state.loaded = 0;
        state.completed.clear();
    }

    /// Record a terminal state for `path`.
    ///
    /// Returns true if the path was newly counted, false if it had already
    /// reached a terminal state within this batch.
    pub fn mark_terminal(&self, path: &str) -> bool {
        let mut state = self.state.lock();
        if state.total == 0 || !state.completed.insert(path.to_string()) {
            return false;
        }
        state.loaded += 1;
        true
    }

    /// (loaded, total) counts for the current batch
    pub fn counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.loaded, state.total)
    }

    /// Overall completion fraction; 1.0 when no batch is active
    pub fn overall_progress(&self) -> f32 {
        let state = self.state.lock();
        if state.total == 0 {
            1.0
        } else {
            state.loaded as f32 / state.total as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_by_extension() {
        assert_eq!(AssetKind::from_path("city/tower.glb"), AssetKind::Model);
        assert_eq!(AssetKind::from_path("city/kiosk.obj"), AssetKind::Model);
        assert_eq!(AssetKind::from_path("city/asphalt.PNG"), AssetKind::Texture);
        assert_eq!(AssetKind::from_path("sky.hdr"), AssetKind::Texture);
        assert_eq!(AssetKind::from_path("no_extension"), AssetKind::Model);
    }

    #[test]
    fn test_batch_counts_each_path_once() {
        let tracker = BatchTracker::new();
        tracker.begin(2);

        assert!(tracker.mark_terminal("a.glb"));
        assert!(!tracker.mark_terminal("a.glb"));
        assert!(tracker.mark_terminal("b.png"));

        assert_eq!(tracker.counts(), (2, 2));
        assert_eq!(tracker.overall_progress(), 1.0);
    }

    #[test]
    fn test_progress_is_one_with_no_batch() {
        let tracker = BatchTracker::new();
        assert_eq!(tracker.overall_progress(), 1.0);

        tracker.begin(4);
        tracker.mark_terminal("a");
        assert_eq!(tracker.overall_progress(), 0.25);
    }

    #[test]
    fn test_listener_can_remove_itself_during_emit() {
        let registry = Arc::new(ListenerRegistry::new());
        let hits = Arc::new(AtomicU64::new(0));

        let id_slot: Arc<Mutex<Option<ProgressListenerId>>> = Arc::new(Mutex::new(None));
        let id = {
            let inner_registry = Arc::clone(&registry);
            let hits = Arc::clone(&hits);
            let id_slot = Arc::clone(&id_slot);
            registry.add(move |_event| {
                hits.fetch_add(1, Ordering::Relaxed);
                if let Some(id) = *id_slot.lock() {
                    inner_registry.remove(id);
                }
            })
        };
        *id_slot.lock() = Some(id);

        let event = ProgressEvent {
            path: "a.glb".to_string(),
            percent: 100.0,
            loaded_bytes: 0,
            total_bytes: 0,
            batch_complete: false,
        };

        registry.emit(&event);
        registry.emit(&event);
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }
}
