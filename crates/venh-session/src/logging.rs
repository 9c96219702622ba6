//! Structured run logging.

use tracing::{debug, error, info, warn};
use venh_models::{BackendMethod, RunId};

/// Logger for run lifecycle events.
///
/// Every event carries the run ID and backend method as fields.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    method: &'static str,
}

impl RunLogger {
    pub fn new(run_id: RunId, method: BackendMethod) -> Self {
        Self {
            run_id: run_id.to_string(),
            method: method.as_str(),
        }
    }

    /// Log the start of a run.
    pub fn log_start(&self, file: &str, size: u64, total_frames: u32) {
        info!(
            run_id = %self.run_id,
            method = self.method,
            file = %file,
            size,
            frames = total_frames,
            "Run started"
        );
    }

    /// Log simulated progress. Debug level, one event per frame.
    pub fn log_progress(&self, processed: u32, total: u32) {
        debug!(
            run_id = %self.run_id,
            method = self.method,
            "Run progress: {}/{}", processed, total
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            method = self.method,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            method = self.method,
            "Run failed: {}", message
        );
    }

    pub fn log_completion(&self, bytes: u64, has_metadata: bool) {
        info!(
            run_id = %self.run_id,
            method = self.method,
            bytes,
            has_metadata,
            "Run completed"
        );
    }
}
