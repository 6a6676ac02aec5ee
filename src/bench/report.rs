//! Benchmark results, averaging, and cross-test comparison
//!
//! Comparison deltas are presentation data only; they are derived from the
//! stored averages and never feed back into any further computation.

use serde::{Deserialize, Serialize};

use crate::metrics::MetricsSample;

/// Arithmetic means of a test's sample sequence
///
/// Integer-scale fields are rounded to the nearest integer after averaging;
/// fps and frame time stay fractional. Memory fields are present only when at
/// least one sample reported a value; absent samples contribute zero to the
/// sum and the average runs over all collected samples.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Averages {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub triangles: u64,
    pub textures: u32,
    pub shaders: u32,
    pub draw_calls: u32,
    pub geometries: u32,
    pub meshes: u32,
    pub lights: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_used_mb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_total_mb: Option<f64>,
}

impl Averages {
    /// Average a sample sequence; zero samples yield the zero-valued record
    pub fn from_samples(samples: &[MetricsSample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let n = samples.len() as f64;
        let mean = |sum: f64| sum / n;
        let mean_rounded = |sum: f64| mean(sum).round();

        let sum_f = |field: fn(&MetricsSample) -> f64| samples.iter().map(field).sum::<f64>();

        let memory_used = samples
            .iter()
            .any(|s| s.memory_used_mb.is_some())
            .then(|| mean(sum_f(|s| s.memory_used_mb.unwrap_or(0.0))));
        let memory_total = samples
            .iter()
            .any(|s| s.memory_total_mb.is_some())
            .then(|| mean(sum_f(|s| s.memory_total_mb.unwrap_or(0.0))));

        Self {
            fps: mean(sum_f(|s| s.fps as f64)) as f32,
            frame_time_ms: mean(sum_f(|s| s.frame_time_ms as f64)) as f32,
            triangles: mean_rounded(sum_f(|s| s.triangles as f64)) as u64,
            textures: mean_rounded(sum_f(|s| s.textures as f64)) as u32,
            shaders: mean_rounded(sum_f(|s| s.shaders as f64)) as u32,
            draw_calls: mean_rounded(sum_f(|s| s.draw_calls as f64)) as u32,
            geometries: mean_rounded(sum_f(|s| s.geometries as f64)) as u32,
            meshes: mean_rounded(sum_f(|s| s.meshes as f64)) as u32,
            lights: mean_rounded(sum_f(|s| s.lights as f64)) as u32,
            memory_used_mb: memory_used,
            memory_total_mb: memory_total,
        }
    }
}

/// Completed benchmark test: its sample sequence and computed averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Test name, unique within a run
    pub name: String,
    /// One sample per collected frame
    pub samples: Vec<MetricsSample>,
    /// Arithmetic means across the sample sequence
    pub averages: Averages,
}

/// One comparison row; delta columns are `None` for the baseline test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub name: String,
    pub averages: Averages,
    /// FPS delta vs baseline, higher is better: `(current/baseline - 1) * 100`
    pub fps_delta_pct: Option<f32>,
    /// Frame-time delta, lower is better: `(baseline/current - 1) * 100`
    pub frame_time_delta_pct: Option<f32>,
    /// Draw-call delta, lower is better (inverted formula)
    pub draw_calls_delta_pct: Option<f32>,
    /// Triangle delta, neutral (same formula as FPS)
    pub triangles_delta_pct: Option<f32>,
    /// Memory delta, lower is better; present only when both sides report it
    pub memory_delta_pct: Option<f32>,
}

/// Structured comparison across a run's results
///
/// The first test is the baseline (100%); every later row carries
/// relative-percentage columns against it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub rows: Vec<ComparisonRow>,
}

/// `(current/baseline - 1) * 100`, for higher-is-better quantities
fn higher_is_better(baseline: f64, current: f64) -> f32 {
    if baseline == 0.0 {
        0.0
    } else {
        ((current / baseline - 1.0) * 100.0) as f32
    }
}

/// `(baseline/current - 1) * 100`, for lower-is-better quantities
fn lower_is_better(baseline: f64, current: f64) -> f32 {
    if current == 0.0 {
        0.0
    } else {
        ((baseline / current - 1.0) * 100.0) as f32
    }
}

impl ComparisonReport {
    /// Build the comparison from completed results; the first is the baseline
    pub fn from_results(results: &[BenchmarkResult]) -> Self {
        let baseline = match results.first() {
            Some(result) => &result.averages,
            None => return Self::default(),
        };

        let rows = results
            .iter()
            .enumerate()
            .map(|(index, result)| {
                let avg = &result.averages;
                let deltas = index > 0;

                let memory_delta = match (baseline.memory_used_mb, avg.memory_used_mb) {
                    (Some(base), Some(cur)) if deltas => Some(lower_is_better(base, cur)),
                    _ => None,
                };

                ComparisonRow {
                    name: result.name.clone(),
                    averages: avg.clone(),
                    fps_delta_pct: deltas
                        .then(|| higher_is_better(baseline.fps as f64, avg.fps as f64)),
                    frame_time_delta_pct: deltas.then(|| {
                        lower_is_better(baseline.frame_time_ms as f64, avg.frame_time_ms as f64)
                    }),
                    draw_calls_delta_pct: deltas.then(|| {
                        lower_is_better(baseline.draw_calls as f64, avg.draw_calls as f64)
                    }),
                    triangles_delta_pct: deltas.then(|| {
                        higher_is_better(baseline.triangles as f64, avg.triangles as f64)
                    }),
                    memory_delta_pct: memory_delta,
                }
            })
            .collect();

        Self { rows }
    }

    /// Render as an aligned plain-text table for log output
    pub fn to_text_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<24} {:>8} {:>10} {:>10} {:>12} {:>8} {:>8} {:>10} {:>8} {:>8}\n",
            "test",
            "fps",
            "frame ms",
            "draws",
            "triangles",
            "meshes",
            "lights",
            "mem MiB",
            "fps %",
            "frame %"
        ));

        for row in &self.rows {
            let avg = &row.averages;
            out.push_str(&format!(
                "{:<24} {:>8.1} {:>10.2} {:>10} {:>12} {:>8} {:>8} {:>10} {:>8} {:>8}\n",
                row.name,
                avg.fps,
                avg.frame_time_ms,
                avg.draw_calls,
                avg.triangles,
                avg.meshes,
                avg.lights,
                avg.memory_used_mb
                    .map(|m| format!("{m:.0}"))
                    .unwrap_or_else(|| "-".to_string()),
                format_delta(row.fps_delta_pct),
                format_delta(row.frame_time_delta_pct),
            ));
        }

        out
    }

    /// Render as a markdown table
    pub fn to_markdown(&self) -> String {
        let mut out = String::from(
            "| Test | FPS | Frame (ms) | Draw calls | Triangles | Meshes | Lights | Memory (MiB) | FPS Δ% | Frame Δ% | Draws Δ% | Tris Δ% | Mem Δ% |\n\
             |------|-----|------------|------------|-----------|--------|--------|--------------|--------|----------|----------|---------|--------|\n",
        );

        for row in &self.rows {
            let avg = &row.averages;
            out.push_str(&format!(
                "| {} | {:.1} | {:.2} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
                row.name,
                avg.fps,
                avg.frame_time_ms,
                avg.draw_calls,
                avg.triangles,
                avg.meshes,
                avg.lights,
                avg.memory_used_mb
                    .map(|m| format!("{m:.0}"))
                    .unwrap_or_else(|| "-".to_string()),
                format_delta(row.fps_delta_pct),
                format_delta(row.frame_time_delta_pct),
                format_delta(row.draw_calls_delta_pct),
                format_delta(row.triangles_delta_pct),
                format_delta(row.memory_delta_pct),
            ));
        }

        out
    }

    /// Serialize the full report as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn format_delta(delta: Option<f32>) -> String {
    match delta {
        Some(value) => format!("{value:+.1}%"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_with_fps(fps: f32, triangles: u64) -> MetricsSample {
        MetricsSample {
            fps,
            frame_time_ms: 1000.0 / fps,
            triangles,
            ..Default::default()
        }
    }

    #[test]
    fn test_averages_mean_and_rounding() {
        let samples = vec![
            sample_with_fps(10.0, 100),
            sample_with_fps(20.0, 101),
            sample_with_fps(30.0, 102),
        ];

        let averages = Averages::from_samples(&samples);
        assert_eq!(averages.fps, 20.0);
        assert_eq!(averages.triangles, 101);
    }

    #[test]
    fn test_averages_zero_samples() {
        let averages = Averages::from_samples(&[]);
        assert_eq!(averages, Averages::default());
        assert_eq!(averages.fps, 0.0);
        assert_eq!(averages.triangles, 0);
        assert!(averages.memory_used_mb.is_none());
    }

    #[test]
    fn test_averages_memory_presence() {
        let with = MetricsSample {
            memory_used_mb: Some(100.0),
            ..Default::default()
        };
        let without = MetricsSample::default();

        // Absent samples contribute zero, averaged over all samples
        let averages = Averages::from_samples(&[with, without]);
        assert_eq!(averages.memory_used_mb, Some(50.0));

        let averages = Averages::from_samples(&[MetricsSample::default()]);
        assert_eq!(averages.memory_used_mb, None);
    }

    fn result_with(name: &str, fps: f32, frame_time_ms: f32) -> BenchmarkResult {
        BenchmarkResult {
            name: name.to_string(),
            samples: Vec::new(),
            averages: Averages {
                fps,
                frame_time_ms,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_comparison_sign_conventions() {
        let results = vec![
            result_with("baseline", 30.0, 20.0),
            result_with("candidate", 60.0, 10.0),
        ];

        let report = ComparisonReport::from_results(&results);
        assert_eq!(report.rows[0].fps_delta_pct, None);

        // Doubled fps and halved frame time both read as +100% improvements
        let row = &report.rows[1];
        assert_eq!(row.fps_delta_pct, Some(100.0));
        assert_eq!(row.frame_time_delta_pct, Some(100.0));
    }

    #[test]
    fn test_comparison_zero_baseline_is_defined() {
        let results = vec![result_with("a", 0.0, 0.0), result_with("b", 60.0, 16.0)];
        let report = ComparisonReport::from_results(&results);
        assert_eq!(report.rows[1].fps_delta_pct, Some(0.0));
    }

    #[test]
    fn test_report_rendering() {
        let results = vec![
            result_with("high", 60.0, 16.7),
            result_with("low", 30.0, 33.3),
        ];
        let report = ComparisonReport::from_results(&results);

        let text = report.to_text_table();
        assert!(text.contains("high"));
        assert!(text.contains("low"));

        let markdown = report.to_markdown();
        assert!(markdown.starts_with("| Test |"));
        assert!(markdown.contains("| high |"));
    }
}
