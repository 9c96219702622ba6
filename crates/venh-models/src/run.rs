//! Run lifecycle state.
//!
//! A run is one upload-to-result cycle for a single file and method. The
//! controller owns the only writable [`RunState`]; everything else gets
//! snapshots.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::frame::{FrameSample, ProcessingStats};
use crate::method::BackendMethod;
use crate::request::ProcessingResult;

/// Unique run identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Nothing submitted yet, or state was reset
    #[default]
    Idle,
    /// Upload in flight
    Processing,
    /// Result available
    Completed,
    /// Run failed
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Processing => "processing",
            RunStatus::Completed => "completed",
            RunStatus::Error => "error",
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Error)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable state of the current run.
///
/// `status == Completed` holds exactly when `result` is set, and
/// `status == Error` always carries an error message.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub run_id: Option<RunId>,
    pub status: RunStatus,
    pub method: Option<BackendMethod>,
    pub result: Option<Arc<ProcessingResult>>,
    pub error: Option<String>,
    pub samples: Vec<FrameSample>,
    pub stats: ProcessingStats,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunState {
    /// Fresh state for a newly started run.
    pub fn started(run_id: RunId, method: BackendMethod, total_frames: u32) -> Self {
        Self {
            run_id: Some(run_id),
            status: RunStatus::Processing,
            method: Some(method),
            result: None,
            error: None,
            samples: Vec::with_capacity(total_frames as usize),
            stats: ProcessingStats::for_run(total_frames),
            started_at: Some(Utc::now()),
            finished_at: None,
        }
    }

    /// Whether this state belongs to `run_id`.
    pub fn is_run(&self, run_id: RunId) -> bool {
        self.run_id == Some(run_id)
    }

    pub fn is_processing(&self) -> bool {
        self.status == RunStatus::Processing
    }

    /// Append a sample and refresh statistics.
    pub fn push_sample(&mut self, sample: FrameSample) {
        self.stats.record(&sample);
        self.samples.push(sample);
    }

    pub fn complete(&mut self, result: Arc<ProcessingResult>) {
        self.status = RunStatus::Completed;
        self.result = Some(result);
        self.error = None;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Error;
        self.result = None;
        self.error = Some(message.into());
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock time between start and finish, if both are known.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        Some(self.finished_at? - self.started_at?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_started_state() {
        let id = RunId::new();
        let state = RunState::started(id, BackendMethod::Unet, 120);
        assert!(state.is_run(id));
        assert!(!state.is_run(RunId::new()));
        assert_eq!(state.status, RunStatus::Processing);
        assert_eq!(state.stats.total_frames, 120);
        assert!(state.samples.is_empty());
    }

    #[test]
    fn test_terminal_transitions_keep_invariants() {
        let mut state = RunState::started(RunId::new(), BackendMethod::Clahe, 50);
        state.complete(Arc::new(ProcessingResult::new(Bytes::from_static(b"mp4"))));
        assert_eq!(state.status, RunStatus::Completed);
        assert!(state.result.is_some());
        assert!(state.status.is_terminal());

        state.fail("oom");
        assert_eq!(state.status, RunStatus::Error);
        assert!(state.result.is_none());
        assert_eq!(state.error.as_deref(), Some("oom"));
        assert!(state.elapsed().is_some());
    }

    #[test]
    fn test_push_sample_updates_stats() {
        let mut state = RunState::started(RunId::new(), BackendMethod::Clahe, 50);
        state.push_sample(FrameSample::new(0, 10.0));
        state.push_sample(FrameSample::new(1, 20.0));
        assert_eq!(state.stats.processed_frames, 2);
        assert_eq!(state.stats.peak_time_ms, 20.0);
        assert_eq!(state.stats.average_time_ms, 15.0);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&RunStatus::Processing).unwrap(), "\"processing\"");
        assert_eq!(RunStatus::default(), RunStatus::Idle);
    }
}
