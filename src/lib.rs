//! Asset streaming, caching, and performance benchmarking for 3D city-scene
//! viewers.
//!
//! The crate has two halves:
//!
//! - **Loading** ([`loader::AssetServer`]): fetches model and texture bytes
//!   through a pluggable [`source::AssetSource`], decodes GLTF/GLB and
//!   OBJ+MTL into scene-ready [`scene::Model`]s, caches decoded results by
//!   path, coalesces concurrent requests for the same path, and reports
//!   per-asset and batch progress to registered listeners.
//! - **Benchmarking** ([`bench::BenchmarkHarness`]): runs named test cases
//!   sequentially against a [`metrics::MetricsSampler`], collecting a fixed
//!   number of per-frame samples per test after an optional stabilization
//!   wait, and produces baseline-relative comparison reports.
//!
//! ```no_run
//! use std::sync::Arc;
//! use skyline_asset::loader::AssetServer;
//! use skyline_asset::source::FileSource;
//!
//! # async fn demo() {
//! let server = AssetServer::new(Arc::new(FileSource::new("assets")));
//! server
//!     .preload_assets(["models/tower.glb", "models/street.obj"])
//!     .await;
//! let tower = server.load_model("models/tower.glb").await;
//! # let _ = tower;
//! # }
//! ```

pub mod bench;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod progress;
pub mod scene;
pub mod source;
pub mod texture;

pub use bench::{BenchmarkConfig, BenchmarkHarness, BenchmarkTest, ComparisonReport};
pub use error::{AssetError, Result};
pub use loader::{AssetServer, CacheStats};
pub use metrics::{MetricsSample, MetricsSampler};
pub use progress::{AssetKind, ProgressEvent, ProgressListenerId};
pub use scene::{Material, Mesh, Model, Texture, Transform, Vertex};
pub use source::{AssetSource, FileSource};

/// Crate version, handy for embedding in benchmark reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_populated() {
        assert!(!VERSION.is_empty());
    }
}
