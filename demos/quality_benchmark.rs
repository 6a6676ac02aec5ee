//! Run a two-step quality benchmark against a simulated renderer and print
//! the comparison table.
//!
//! Usage: `cargo run --example quality_benchmark`

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;

use skyline_asset::bench::{BenchmarkConfig, BenchmarkHarness, BenchmarkTest};
use skyline_asset::metrics::{MetricsSample, MetricsSampler};

/// Stand-in for a renderer: quality knob drives the reported numbers
struct SimulatedRenderer {
    draw_calls: Mutex<u32>,
}

impl SimulatedRenderer {
    fn set_draw_calls(&self, calls: u32) {
        *self.draw_calls.lock() = calls;
    }
}

impl MetricsSampler for SimulatedRenderer {
    fn sample(&self) -> MetricsSample {
        let draw_calls = *self.draw_calls.lock();
        let frame_time_ms = 4.0 + draw_calls as f32 * 0.02;
        MetricsSample {
            fps: 1000.0 / frame_time_ms,
            frame_time_ms,
            draw_calls,
            triangles: draw_calls as u64 * 1200,
            meshes: draw_calls / 2,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let renderer = Arc::new(SimulatedRenderer {
        draw_calls: Mutex::new(0),
    });

    let config = BenchmarkConfig {
        frames_per_test: 60,
        stabilization_time: Duration::from_millis(200),
        ..Default::default()
    };

    let mut harness =
        BenchmarkHarness::new(config, renderer.clone() as Arc<dyn MetricsSampler>);

    let high = Arc::clone(&renderer);
    harness.add_test(BenchmarkTest::new("high_quality", move || {
        let renderer = Arc::clone(&high);
        async move {
            renderer.set_draw_calls(800);
            Ok(())
        }
        .boxed()
    }));

    let batched = Arc::clone(&renderer);
    harness.add_test(BenchmarkTest::new("instanced_draws", move || {
        let renderer = Arc::clone(&batched);
        async move {
            renderer.set_draw_calls(120);
            Ok(())
        }
        .boxed()
    }));

    harness.run_all().await?;

    let report = harness.create_report();
    print!("{}", report.to_text_table());
    Ok(())
}
