//! Session configuration.

use std::time::Duration;

/// Timing configuration for processing runs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay between simulated frame samples
    pub frame_interval: Duration,
    /// Minimum time a run stays in `processing`, even when the backend
    /// answers immediately
    pub min_display: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(100),
            min_display: Duration::from_millis(2000),
        }
    }
}

/// Upper bound for the sample cadence, in milliseconds.
pub const MAX_FRAME_INTERVAL_MS: u64 = 60_000;
/// Upper bound for the minimum display time, in milliseconds.
pub const MAX_MIN_DISPLAY_MS: u64 = 3_600_000;

impl SessionConfig {
    /// Create config from environment variables.
    ///
    /// Out-of-range values are clamped.
    pub fn from_env() -> Self {
        Self {
            frame_interval: frame_interval_from(std::env::var("VENH_FRAME_INTERVAL_MS").ok()),
            min_display: min_display_from(std::env::var("VENH_MIN_DISPLAY_MS").ok()),
        }
    }
}

fn frame_interval_from(raw: Option<String>) -> Duration {
    let ms = raw.and_then(|s| s.trim().parse().ok()).unwrap_or(100u64);
    Duration::from_millis(ms.clamp(1, MAX_FRAME_INTERVAL_MS))
}

fn min_display_from(raw: Option<String>) -> Duration {
    let ms = raw.and_then(|s| s.trim().parse().ok()).unwrap_or(2000u64);
    Duration::from_millis(ms.min(MAX_MIN_DISPLAY_MS))
}
