//! Terminal rendering of run state and metadata.

use std::fmt::Display;
use std::path::Path;

use serde::Serialize;
use venh_models::{
    BackendMethod, EnhancementMethod, ProcessingMetadata, ProcessingStats, RunStatus,
};

const NOT_AVAILABLE: &str = "N/A";

/// Format an optional value, with `N/A` for missing ones.
pub fn fmt_opt<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

/// Format a duration in seconds: milliseconds below one second.
pub fn fmt_seconds(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s > 0.0 && s < 1.0 => format!("{:.0}ms", s * 1000.0),
        Some(s) if s >= 1.0 => format!("{:.2}s", s),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format a utilisation percentage. Zero reads as not reported.
pub fn fmt_percent(percent: Option<f64>) -> String {
    match percent {
        Some(p) if p > 0.0 => format!("{:.1}%", p),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Human-readable file size (1024-based, up to two decimals).
pub fn fmt_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exp = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exp])
}

/// One-line progress summary.
pub fn progress_line(stats: &ProcessingStats) -> String {
    format!(
        "frame {}/{} ({:.0}%)  avg {:.1}ms  peak {:.1}ms",
        stats.processed_frames,
        stats.total_frames,
        stats.completion() * 100.0,
        stats.average_time_ms,
        stats.peak_time_ms
    )
}

/// Label/value rows describing a finished run.
pub fn metadata_rows(metadata: Option<&ProcessingMetadata>) -> Vec<(&'static str, String)> {
    let m = metadata.cloned().unwrap_or_default();
    let specs = m.device_specs.clone().unwrap_or_default();

    vec![
        ("Process", fmt_opt(m.process_category)),
        ("Model", fmt_opt(m.model_used)),
        ("Device", fmt_opt(m.device_used)),
        ("Total frames", fmt_opt(m.total_frames)),
        ("Processed frames", fmt_opt(m.processed_frames)),
        ("Total time", fmt_seconds(m.total_time)),
        ("Avg per frame", fmt_seconds(m.avg_delay_per_frame)),
        ("CPU usage", fmt_percent(m.cpu_usage_percent)),
        ("GPU usage", fmt_percent(m.gpu_usage_percent)),
        ("CPU", fmt_opt(specs.cpu)),
        ("GPU", fmt_opt(specs.gpu)),
    ]
}

pub fn print_rows(rows: &[(&str, String)]) {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        println!("{:<width$}  {}", label, value, width = width);
    }
}

/// JSON summary of a finished run.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub status: RunStatus,
    pub method: Option<BackendMethod>,
    pub output: Option<&'a Path>,
    pub bytes: Option<u64>,
    pub stats: ProcessingStats,
    pub metadata: Option<&'a ProcessingMetadata>,
    pub error: Option<&'a str>,
}

/// Method catalogue entry for `venh methods --json`.
#[derive(Debug, Serialize)]
pub struct MethodEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub backend: BackendMethod,
    pub sub_methods: Vec<&'static str>,
}

pub fn method_entries() -> Vec<MethodEntry> {
    EnhancementMethod::ALL
        .iter()
        .map(|m| MethodEntry {
            id: m.id(),
            name: m.display_name(),
            backend: m.backend_method(),
            sub_methods: m.sub_methods().iter().map(|s| s.id).collect(),
        })
        .collect()
}
