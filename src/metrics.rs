//! Metrics sampler interface
//!
//! The benchmark harness consumes point-in-time render/scene statistics
//! through [`MetricsSampler`]; the renderer owns the numbers, this crate only
//! defines the snapshot shape and the pull interface.

use serde::{Deserialize, Serialize};

/// A point-in-time snapshot of render and scene statistics
///
/// Memory fields are platform-dependent and may be absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSample {
    /// Frames per second
    pub fps: f32,
    /// Frame time in milliseconds
    pub frame_time_ms: f32,
    /// Rendered triangle count
    pub triangles: u64,
    /// Live texture count
    pub textures: u32,
    /// Compiled shader/program count
    pub shaders: u32,
    /// Draw calls per frame
    pub draw_calls: u32,
    /// Live geometry count
    pub geometries: u32,
    /// Mesh count in the scene
    pub meshes: u32,
    /// Light count in the scene
    pub lights: u32,
    /// Used heap memory in MiB, when the platform reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_used_mb: Option<f64>,
    /// Total heap memory in MiB, when the platform reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_total_mb: Option<f64>,
}

/// Source of [`MetricsSample`] snapshots, polled once per sampling tick
pub trait MetricsSampler: Send + Sync {
    /// Take a snapshot of the current render/scene statistics
    fn sample(&self) -> MetricsSample;
}

/// Any zero-argument callable returning a sample is a sampler
impl<F> MetricsSampler for F
where
    F: Fn() -> MetricsSample + Send + Sync,
{
    fn sample(&self) -> MetricsSample {
        self()
    }
}
