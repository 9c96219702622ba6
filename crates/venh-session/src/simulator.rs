//! Simulated per-frame progress.
//!
//! The backend reports nothing while it works, so the run shows fabricated
//! per-frame timings instead: the frame count is estimated from the file
//! size, each frame gets a method-dependent baseline plus jitter, and the
//! samples are released on a fixed cadence. None of this is measured; swap
//! this module out if the backend ever streams real progress.

use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use venh_models::FrameSample;

/// Rough encoded size of one frame, used for the frame estimate.
pub const BYTES_PER_FRAME: u64 = 50_000;
pub const MIN_FRAMES: u32 = 50;
pub const MAX_FRAMES: u32 = 300;
/// Jitter applied around the baseline, in milliseconds (symmetric).
pub const JITTER_MS: f64 = 15.0;
/// Floor for any sample, in milliseconds.
pub const MIN_SAMPLE_MS: f64 = 5.0;
const DEFAULT_BASELINE_MS: f64 = 25.0;

/// Estimate how many frames a file of `file_size` bytes holds.
pub fn estimate_frames(file_size: u64) -> u32 {
    (file_size / BYTES_PER_FRAME).clamp(MIN_FRAMES as u64, MAX_FRAMES as u64) as u32
}

/// Baseline per-frame time for a method, in milliseconds.
///
/// Heavier models get larger baselines. Accepts both backend identifiers
/// and user-facing method names.
pub fn baseline_ms(method: &str) -> f64 {
    match method {
        "clahe" | "low-light" => 30.0,
        "deraining" => 45.0,
        "dehazing" => 40.0,
        "glare" => 35.0,
        "tilt" => 20.0,
        "unet" => 35.0,
        "automatic" | "unet_selective" => 50.0,
        _ => DEFAULT_BASELINE_MS,
    }
}

/// Generates simulated progress plans.
#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    frame_interval: Duration,
}

impl ProgressSimulator {
    pub fn new(frame_interval: Duration) -> Self {
        Self { frame_interval }
    }

    /// Build a plan for a run using the thread-local RNG.
    pub fn plan(&self, file_size: u64, method: &str) -> SimulationPlan {
        self.plan_with_rng(file_size, method, &mut rand::rng())
    }

    /// Build a plan for a run from a caller-supplied RNG.
    pub fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        file_size: u64,
        method: &str,
        rng: &mut R,
    ) -> SimulationPlan {
        let total_frames = estimate_frames(file_size);
        let baseline = baseline_ms(method);

        let samples = (0..total_frames)
            .map(|frame| {
                let jitter = rng.random_range(-JITTER_MS..JITTER_MS);
                FrameSample::new(frame, (baseline + jitter).max(MIN_SAMPLE_MS))
            })
            .collect();

        SimulationPlan {
            samples,
            frame_interval: self.frame_interval,
        }
    }
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

/// Sleep until `start + offset`, or forever if that is past the clock's range.
pub(crate) async fn sleep_until_offset(start: Instant, offset: Duration) {
    match start.checked_add(offset) {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Pre-generated samples for one run and the cadence to release them at.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    samples: Vec<FrameSample>,
    frame_interval: Duration,
}

impl SimulationPlan {
    pub fn total_frames(&self) -> u32 {
        self.samples.len() as u32
    }

    pub fn samples(&self) -> &[FrameSample] {
        &self.samples
    }

    /// Nominal length of the simulation: one interval per frame.
    pub fn nominal_duration(&self) -> Duration {
        self.frame_interval.saturating_mul(self.total_frames())
    }

    /// Release samples in frame order, sample `k` at `start + k * frame_interval`.
    ///
    /// Deadlines are measured from `start` so the cadence does not drift.
    /// Deadlines past the clock's range are never reached.
    pub async fn emit<F>(self, start: Instant, mut on_sample: F)
    where
        F: FnMut(FrameSample),
    {
        for (index, sample) in self.samples.into_iter().enumerate() {
            sleep_until_offset(start, self.frame_interval.saturating_mul(index as u32)).await;
            on_sample(sample);
        }
    }
}
