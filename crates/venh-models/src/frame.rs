//! Per-frame timing samples and running statistics.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Timing sample for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FrameSample {
    /// Zero-based frame index within the run
    pub frame_number: u32,
    /// Time spent on the frame in milliseconds
    #[serde(rename = "processingTime")]
    pub processing_time_ms: f64,
}

impl FrameSample {
    pub fn new(frame_number: u32, processing_time_ms: f64) -> Self {
        Self {
            frame_number,
            processing_time_ms,
        }
    }
}

/// Aggregate statistics over the samples observed so far in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    /// Mean processing time in milliseconds
    #[serde(rename = "averageTime")]
    pub average_time_ms: f64,
    /// Largest processing time in milliseconds
    #[serde(rename = "peakTime")]
    pub peak_time_ms: f64,
    /// Frames expected for the run (fixed at run start)
    pub total_frames: u32,
    /// Frames observed so far
    pub processed_frames: u32,
}

impl ProcessingStats {
    /// Empty statistics for a run expecting `total_frames` frames.
    pub fn for_run(total_frames: u32) -> Self {
        Self {
            total_frames,
            ..Default::default()
        }
    }

    /// Fold a sequence of samples into statistics.
    pub fn from_samples(samples: &[FrameSample], total_frames: u32) -> Self {
        samples
            .iter()
            .fold(Self::for_run(total_frames), |mut stats, sample| {
                stats.record(sample);
                stats
            })
    }

    /// Incorporate one more sample.
    pub fn record(&mut self, sample: &FrameSample) {
        let count = self.processed_frames as f64;
        self.average_time_ms =
            (self.average_time_ms * count + sample.processing_time_ms) / (count + 1.0);
        if self.processed_frames == 0 || sample.processing_time_ms > self.peak_time_ms {
            self.peak_time_ms = sample.processing_time_ms;
        }
        self.processed_frames += 1;
    }

    /// Fraction of frames observed, in `[0, 1]`.
    pub fn completion(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        (self.processed_frames as f64 / self.total_frames as f64).min(1.0)
    }
}
