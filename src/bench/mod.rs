//! Frame-synchronized benchmark harness
//!
//! Runs a registered sequence of named test cases strictly one at a time:
//! setup, an optional stabilization wait, a fixed-width sampling window, then
//! teardown. Tests share one scene context, so teardown of test N completes
//! before setup of test N+1 begins. Per-test averages and the cross-test
//! comparison live in [`report`].

pub mod report;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::metrics::{MetricsSample, MetricsSampler};

pub use report::{Averages, BenchmarkResult, ComparisonReport, ComparisonRow};

type TestFn = Box<dyn FnMut() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// A user-supplied benchmark test case, immutable once registered
pub struct BenchmarkTest {
    name: String,
    setup: TestFn,
    teardown: Option<TestFn>,
}

impl BenchmarkTest {
    /// Create a test with a setup procedure
    ///
    /// Setup may be asynchronous (e.g. scene construction through the asset
    /// server); the harness awaits it before sampling starts.
    pub fn new(
        name: impl Into<String>,
        setup: impl FnMut() -> BoxFuture<'static, anyhow::Result<()>> + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            setup: Box::new(setup),
            teardown: None,
        }
    }

    /// Attach a teardown procedure that removes this test's scene contribution
    pub fn with_teardown(
        mut self,
        teardown: impl FnMut() -> BoxFuture<'static, anyhow::Result<()>> + Send + 'static,
    ) -> Self {
        self.teardown = Some(Box::new(teardown));
        self
    }

    /// Test name, unique within a run
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for BenchmarkTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkTest")
            .field("name", &self.name)
            .field("has_teardown", &self.teardown.is_some())
            .finish()
    }
}

/// Status carried by harness progress callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Starting,
    Stabilizing,
    Collecting { frame: u32 },
    Completed,
}

/// Progress callback payload
#[derive(Debug, Clone)]
pub struct TestProgress {
    pub test_name: String,
    pub test_index: usize,
    pub total_tests: usize,
    pub status: TestStatus,
}

/// Harness configuration
pub struct BenchmarkConfig {
    /// Number of per-frame samples to collect per test
    pub frames_per_test: u32,
    /// Whether to hold collection until transient effects settle
    pub wait_for_stabilization: bool,
    /// Minimum wall-clock stabilization duration
    pub stabilization_time: Duration,
    /// Log each completed test through the `log` crate
    pub log_results: bool,
    /// Optional observer for per-test progress
    pub on_progress: Option<Box<dyn Fn(&TestProgress) + Send + Sync>>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            frames_per_test: 100,
            wait_for_stabilization: true,
            stabilization_time: Duration::from_millis(2000),
            log_results: true,
            on_progress: None,
        }
    }
}

impl std::fmt::Debug for BenchmarkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkConfig")
            .field("frames_per_test", &self.frames_per_test)
            .field("wait_for_stabilization", &self.wait_for_stabilization)
            .field("stabilization_time", &self.stabilization_time)
            .field("log_results", &self.log_results)
            .field("has_on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// Yields once per rendered frame
///
/// The harness polls the sampler on every frame boundary this clock
/// produces; tests substitute counting or immediate clocks.
#[async_trait]
pub trait FrameClock: Send {
    async fn next_frame(&mut self);
}

/// Fixed-rate frame clock driven by a tokio interval
pub struct IntervalClock {
    interval: tokio::time::Interval,
}

impl IntervalClock {
    /// Create a clock ticking at the given frame rate (frames per second)
    pub fn new(frame_rate: f32) -> Self {
        let period = Duration::from_secs_f32(1.0 / frame_rate.max(1.0));
        Self {
            interval: tokio::time::interval(period),
        }
    }

    /// Conventional 60 Hz render cadence
    pub fn sixty_hz() -> Self {
        Self::new(60.0)
    }
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&mut self) {
        self.interval.tick().await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Setup,
    Stabilizing,
    Collecting,
    Teardown,
}

/// Orchestrates a sequence of benchmark tests against a metrics sampler
pub struct BenchmarkHarness {
    config: BenchmarkConfig,
    sampler: Arc<dyn MetricsSampler>,
    clock: Box<dyn FrameClock>,
    tests: Vec<BenchmarkTest>,
    results: Vec<BenchmarkResult>,
    phase: Phase,
    current_samples: Vec<MetricsSample>,
}

impl BenchmarkHarness {
    /// Create a harness polling the given sampler at 60 Hz
    pub fn new(config: BenchmarkConfig, sampler: Arc<dyn MetricsSampler>) -> Self {
        Self {
            config,
            sampler,
            clock: Box::new(IntervalClock::sixty_hz()),
            tests: Vec::new(),
            results: Vec::new(),
            phase: Phase::Idle,
            current_samples: Vec::new(),
        }
    }

    /// Replace the frame clock (fixed-rate by default)
    pub fn with_clock(mut self, clock: Box<dyn FrameClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a test; tests run in registration order
    pub fn add_test(&mut self, test: BenchmarkTest) {
        self.tests.push(test);
    }

    /// Results completed so far, also populated on an aborted run
    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    /// Feed one sample into the active collection window.
    ///
    /// No-op outside the collecting phase: samples arriving during
    /// stabilization (or between tests) are discarded so one-time setup cost
    /// never biases the averages.
    pub fn record_metrics(&mut self, sample: MetricsSample) {
        if self.phase == Phase::Collecting {
            self.current_samples.push(sample);
        }
    }

    /// Run every registered test sequentially and return their results.
    ///
    /// A setup failure aborts the remaining schedule and propagates: partial
    /// results stay readable via [`results`](Self::results) but the run is
    /// not considered complete. Teardown failures are logged and non-fatal.
    pub async fn run_all(&mut self) -> anyhow::Result<Vec<BenchmarkResult>> {
        self.results.clear();
        let total = self.tests.len();
        log::info!("starting benchmark run with {total} tests");

        let mut tests = std::mem::take(&mut self.tests);
        let mut failure = None;

        for (index, test) in tests.iter_mut().enumerate() {
            if let Err(err) = self.run_test(index, total, test).await {
                failure = Some(err);
                break;
            }
        }

        self.tests = tests;
        self.phase = Phase::Idle;

        match failure {
            Some(err) => Err(err),
            None => Ok(self.results.clone()),
        }
    }

    /// Build the cross-test comparison from the results gathered so far
    pub fn create_report(&self) -> ComparisonReport {
        ComparisonReport::from_results(&self.results)
    }

    async fn run_test(
        &mut self,
        index: usize,
        total: usize,
        test: &mut BenchmarkTest,
    ) -> anyhow::Result<()> {
        self.notify(&test.name, index, total, TestStatus::Starting);
        log::debug!("benchmark '{}' setup", test.name);

        self.phase = Phase::Setup;
        (test.setup)()
            .await
            .map_err(|err| err.context(format!("setup failed for benchmark '{}'", test.name)))?;

        if self.config.wait_for_stabilization {
            self.phase = Phase::Stabilizing;
            self.notify(&test.name, index, total, TestStatus::Stabilizing);

            let deadline = Instant::now() + self.config.stabilization_time;
            while Instant::now() < deadline {
                self.clock.next_frame().await;
                // Polled but discarded: record_metrics gates on phase
                let sample = self.sampler.sample();
                self.record_metrics(sample);
            }
        }

        self.phase = Phase::Collecting;
        self.current_samples.clear();
        while (self.current_samples.len() as u32) < self.config.frames_per_test {
            self.clock.next_frame().await;
            let sample = self.sampler.sample();
            self.record_metrics(sample);

            let frame = self.current_samples.len() as u32;
            if frame % 10 == 0 {
                self.notify(&test.name, index, total, TestStatus::Collecting { frame });
            }
        }

        self.phase = Phase::Teardown;
        if let Some(teardown) = test.teardown.as_mut() {
            if let Err(err) = teardown().await {
                // Surfaced but non-fatal; stale scene state is the caller's
                // signal to distrust the following tests
                log::error!("teardown failed for benchmark '{}': {err:#}", test.name);
            }
        }

        self.phase = Phase::Idle;
        let samples = std::mem::take(&mut self.current_samples);
        let averages = Averages::from_samples(&samples);

        if self.config.log_results {
            log::info!(
                "benchmark '{}' complete: {:.1} fps avg over {} frames",
                test.name,
                averages.fps,
                samples.len()
            );
        }

        self.notify(&test.name, index, total, TestStatus::Completed);
        self.results.push(BenchmarkResult {
            name: test.name.clone(),
            samples,
            averages,
        });

        Ok(())
    }

    fn notify(&self, name: &str, index: usize, total: usize, status: TestStatus) {
        if let Some(on_progress) = &self.config.on_progress {
            on_progress(&TestProgress {
                test_name: name.to_string(),
                test_index: index,
                total_tests: total,
                status,
            });
        }
    }
}
