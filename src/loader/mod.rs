//! Asset cache and loader
//!
//! [`AssetServer`] is the public entry point for asset loading: it dispatches
//! paths to the right decoder by extension, caches decoded results keyed by
//! path, coalesces concurrent requests for the same uncached path into a
//! single decode, and drives batched preloads with aggregate progress.
//!
//! The server is an explicitly constructed component, not a global: the
//! composition root creates one and hands out cheap clones of the handle.

pub mod gltf;
pub mod obj;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{join_all, BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};

use crate::error::AssetError;
use crate::progress::{
    AssetKind, BatchTracker, ListenerRegistry, ProgressEvent, ProgressListenerId,
};
use crate::scene::{Model, Texture};
use crate::source::AssetSource;
use crate::texture::TextureDecoder;

type SharedModelLoad = Shared<BoxFuture<'static, Option<Model>>>;
type SharedTextureLoad = Shared<BoxFuture<'static, Option<Arc<Texture>>>>;

/// Snapshot of cache hit/miss counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Cache hit rate as a percentage
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f32 / total as f32 * 100.0
        } else {
            0.0
        }
    }
}

struct Inner {
    source: Arc<dyn AssetSource>,
    models: RwLock<HashMap<String, Model>>,
    textures: RwLock<HashMap<String, Arc<Texture>>>,
    pending_models: Mutex<HashMap<String, SharedModelLoad>>,
    pending_textures: Mutex<HashMap<String, SharedTextureLoad>>,
    texture_decoder: TextureDecoder,
    listeners: ListenerRegistry,
    batch: BatchTracker,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

/// Loads and caches scene assets by path
///
/// Cheap to clone; all clones share the same cache and batch state.
#[derive(Clone)]
pub struct AssetServer {
    inner: Arc<Inner>,
}

impl AssetServer {
    /// Create a new asset server over the given byte source
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                models: RwLock::new(HashMap::new()),
                textures: RwLock::new(HashMap::new()),
                pending_models: Mutex::new(HashMap::new()),
                pending_textures: Mutex::new(HashMap::new()),
                texture_decoder: TextureDecoder::new(),
                listeners: ListenerRegistry::new(),
                batch: BatchTracker::new(),
                cache_hits: AtomicU64::new(0),
                cache_misses: AtomicU64::new(0),
            }),
        }
    }

    /// Load a model, returning an independent copy the caller may mutate.
    ///
    /// Returns `None` when the decode fails; failures are logged and reported
    /// through the progress channel, never raised to the caller. A failed
    /// path is not cached, so a later request retries the load.
    pub async fn load_model(&self, path: &str) -> Option<Model> {
        if let Some(model) = self.inner.models.read().get(path) {
            self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Some(model.clone());
        }
        self.inner.cache_misses.fetch_add(1, Ordering::Relaxed);

        let load = {
            let mut pending = self.inner.pending_models.lock();
            match pending.get(path) {
                // A decode for this path is already in flight; await it
                Some(existing) => existing.clone(),
                None => {
                    let inner = Arc::clone(&self.inner);
                    let key = path.to_string();
                    let load = async move {
                        // Re-check the cache: a decode may have completed
                        // between the caller's cache miss and this point
                        let cached = inner.models.read().get(&key).cloned();
                        let outcome = match cached {
                            Some(model) => Some(model),
                            None => match inner.decode_model(&key).await {
                                Ok(model) => {
                                    inner.models.write().insert(key.clone(), model.clone());
                                    Some(model)
                                }
                                Err(err) => {
                                    log::warn!("failed to load model '{key}': {err}");
                                    None
                                }
                            },
                        };
                        inner.pending_models.lock().remove(&key);
                        outcome
                    }
                    .boxed()
                    .shared();
                    pending.insert(path.to_string(), load.clone());
                    load
                }
            }
        };

        load.await
    }

    /// Load a texture, returning a shared immutable handle.
    ///
    /// Same failure contract as [`load_model`](Self::load_model).
    pub async fn load_texture(&self, path: &str) -> Option<Arc<Texture>> {
        if let Some(texture) = self.inner.textures.read().get(path) {
            self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Some(Arc::clone(texture));
        }
        self.inner.cache_misses.fetch_add(1, Ordering::Relaxed);

        let load = {
            let mut pending = self.inner.pending_textures.lock();
            match pending.get(path) {
                Some(existing) => existing.clone(),
                None => {
                    let inner = Arc::clone(&self.inner);
                    let key = path.to_string();
                    let load = async move {
                        let cached = inner.textures.read().get(&key).cloned();
                        let outcome = match cached {
                            Some(texture) => Some(texture),
                            None => match inner.decode_texture(&key).await {
                                Ok(texture) => {
                                    let texture = Arc::new(texture);
                                    inner
                                        .textures
                                        .write()
                                        .insert(key.clone(), Arc::clone(&texture));
                                    Some(texture)
                                }
                                Err(err) => {
                                    log::warn!("failed to load texture '{key}': {err}");
                                    None
                                }
                            },
                        };
                        inner.pending_textures.lock().remove(&key);
                        outcome
                    }
                    .boxed()
                    .shared();
                    pending.insert(path.to_string(), load.clone());
                    load
                }
            }
        };

        load.await
    }

    /// Preload a batch of assets, resolving once every path has reached a
    /// terminal state (loaded or failed).
    ///
    /// Each path is classified by extension and loaded concurrently. Every
    /// path is counted toward batch progress exactly once, cache hits and
    /// failures included; a final synthetic event with `batch_complete` set
    /// closes the batch.
    pub async fn preload_assets<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // Dedupe while preserving order; a batch tracks unique paths
        let mut unique: Vec<String> = Vec::new();
        for path in paths {
            let path = path.into();
            if !unique.contains(&path) {
                unique.push(path);
            }
        }

        self.inner.batch.begin(unique.len());
        log::debug!("preloading {} assets", unique.len());

        let loads = unique.iter().map(|path| async move {
            match AssetKind::from_path(path) {
                AssetKind::Texture => {
                    let _ = self.load_texture(path).await;
                }
                AssetKind::Model => {
                    let _ = self.load_model(path).await;
                }
            }
            self.inner.finish_batch_item(path);
        });

        join_all(loads).await;

        let (loaded, total) = self.inner.batch.counts();
        self.inner.listeners.emit(&ProgressEvent {
            path: String::new(),
            percent: 100.0,
            loaded_bytes: loaded as u64,
            total_bytes: total as u64,
            batch_complete: true,
        });
    }

    /// Drop every cached model and texture
    pub fn clear_cache(&self) {
        self.inner.models.write().clear();
        self.inner.textures.write().clear();
    }

    /// Register a progress listener
    pub fn add_progress_listener(
        &self,
        listener: impl Fn(&ProgressEvent) + Send + Sync + 'static,
    ) -> ProgressListenerId {
        self.inner.listeners.add(listener)
    }

    /// Remove a previously registered progress listener
    pub fn remove_progress_listener(&self, id: ProgressListenerId) {
        self.inner.listeners.remove(id)
    }

    /// Overall completion fraction of the current batch, in [0, 1].
    ///
    /// Returns 1.0 when no batch is active.
    pub fn overall_progress(&self) -> f32 {
        self.inner.batch.overall_progress()
    }

    /// Snapshot of cache hit/miss counters
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.cache_hits.load(Ordering::Relaxed),
            misses: self.inner.cache_misses.load(Ordering::Relaxed),
        }
    }
}

impl Inner {
    async fn decode_model(&self, path: &str) -> Result<Model, AssetError> {
        log::debug!("decoding model '{path}'");
        let emit = |loaded: u64, total: u64| self.emit_download_progress(path, loaded, total);
        let bytes = self.source.fetch(path, &emit).await?;

        let is_obj = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));

        let mut model = if is_obj {
            obj::decode(self.source.as_ref(), path, &bytes).await?
        } else {
            gltf::decode(path, &bytes)?
        };

        model.name = Path::new(path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());

        // Exactly once, before the model reaches the cache
        model.normalize_for_scene();
        Ok(model)
    }

    async fn decode_texture(&self, path: &str) -> Result<Texture, AssetError> {
        log::debug!("decoding texture '{path}'");
        let emit = |loaded: u64, total: u64| self.emit_download_progress(path, loaded, total);
        let bytes = self.source.fetch(path, &emit).await?;
        self.texture_decoder.decode(Some(path.to_string()), &bytes)
    }

    fn emit_download_progress(&self, path: &str, loaded: u64, total: u64) {
        let percent = if total > 0 {
            (loaded as f32 / total as f32 * 100.0).min(100.0)
        } else {
            0.0
        };
        self.listeners.emit(&ProgressEvent {
            path: path.to_string(),
            percent,
            loaded_bytes: loaded,
            total_bytes: total,
            batch_complete: false,
        });
    }

    /// Count a terminal state toward the batch and emit the per-asset
    /// completion event. A path already counted in this batch is ignored.
    fn finish_batch_item(&self, path: &str) {
        if self.batch.mark_terminal(path) {
            self.listeners.emit(&ProgressEvent {
                path: path.to_string(),
                percent: 100.0,
                loaded_bytes: 0,
                total_bytes: 0,
                batch_complete: false,
            });
        }
    }
}

/// Generate smooth per-vertex normals by accumulating face normals
pub(crate) fn generate_smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    use glam::Vec3;

    let mut normals = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            log::warn!("vertex index out of bounds while generating normals");
            continue;
        }

        let v0 = Vec3::from_array(positions[i0]);
        let v1 = Vec3::from_array(positions[i1]);
        let v2 = Vec3::from_array(positions[i2]);
        let face_normal = (v1 - v0).cross(v2 - v0);

        if face_normal.length_squared() > 1e-6 {
            let face_normal = face_normal.normalize();
            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }
    }

    normals
        .into_iter()
        .map(|n| {
            if n.length_squared() > 1e-6 {
                n.normalize().to_array()
            } else {
                [0.0, 0.0, 1.0]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats { hits: 3, misses: 1 };
        assert_eq!(stats.hit_rate(), 75.0);

        let empty = CacheStats { hits: 0, misses: 0 };
        assert_eq!(empty.hit_rate(), 0.0);
    }

    #[test]
    fn test_smooth_normals_for_flat_quad() {
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ];
        let indices = [0, 2, 1, 0, 3, 2];

        let normals = generate_smooth_normals(&positions, &indices);
        for normal in normals {
            assert!((normal[1] - 1.0).abs() < 1e-5, "expected +Y normal, got {normal:?}");
        }
    }

    #[test]
    fn test_smooth_normals_degenerate_fallback() {
        let positions = [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        let normals = generate_smooth_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals, vec![[0.0, 0.0, 1.0]; 3]);
    }
}
