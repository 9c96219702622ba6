//! Run metadata reported by the processing backend.
//!
//! The backend logs each run as a nested record (`video` and `performance`
//! sections). Consumers only care about a handful of fields, so the record is
//! flattened on the way in. Flat records (snake_case or camelCase) are accepted
//! as well so previously flattened metadata can be read back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CPU and GPU model names of the machine that processed the video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpecs {
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub cpu: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub gpu: Option<String>,
}

/// Flattened run metadata. Every field is optional.
///
/// Fields the backend reports with an unexpected type are dropped rather
/// than failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMetadata")]
pub struct ProcessingMetadata {
    /// Enhancement category, e.g. "Low Light Enhancement"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_category: Option<String>,
    /// Model identifier, e.g. "CLAHE" or "UNet"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_frames: Option<u64>,
    /// Source duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Total processing time in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<f64>,
    /// Average delay per frame in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_delay_per_frame: Option<f64>,
    /// "CPU" or "GPU"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_usage_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_usage_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_specs: Option<DeviceSpecs>,
}

impl ProcessingMetadata {
    /// Read metadata from an arbitrary JSON value.
    ///
    /// Anything that is not an object yields empty metadata.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Whether the backend reported anything useful at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawVideo {
    #[serde(deserialize_with = "lenient::count")]
    total_frames: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    processed_frames: Option<u64>,
    #[serde(deserialize_with = "lenient::number")]
    duration: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    resolution: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    fps: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPerformance {
    #[serde(deserialize_with = "lenient::number")]
    total_time: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    avg_delay_per_frame: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    device_used: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    cpu_usage_percent: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    gpu_usage_percent: Option<f64>,
    #[serde(deserialize_with = "lenient::section")]
    device_specs: Option<DeviceSpecs>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMetadata {
    #[serde(alias = "processCategory", deserialize_with = "lenient::string")]
    process_category: Option<String>,
    #[serde(alias = "modelUsed", deserialize_with = "lenient::string")]
    model_used: Option<String>,
    #[serde(deserialize_with = "lenient::section")]
    video: Option<RawVideo>,
    #[serde(deserialize_with = "lenient::section")]
    performance: Option<RawPerformance>,
    #[serde(alias = "totalFrames", deserialize_with = "lenient::count")]
    total_frames: Option<u64>,
    #[serde(alias = "processedFrames", deserialize_with = "lenient::count")]
    processed_frames: Option<u64>,
    #[serde(deserialize_with = "lenient::number")]
    duration: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    resolution: Option<String>,
    #[serde(alias = "frameRate", deserialize_with = "lenient::number")]
    fps: Option<f64>,
    #[serde(alias = "totalTime", deserialize_with = "lenient::number")]
    total_time: Option<f64>,
    #[serde(alias = "avgDelayPerFrame", deserialize_with = "lenient::number")]
    avg_delay_per_frame: Option<f64>,
    #[serde(alias = "deviceUsed", deserialize_with = "lenient::string")]
    device_used: Option<String>,
    #[serde(
        alias = "cpuUsage",
        alias = "cpu_usage",
        deserialize_with = "lenient::number"
    )]
    cpu_usage_percent: Option<f64>,
    #[serde(
        alias = "gpuUsage",
        alias = "gpu_usage",
        deserialize_with = "lenient::number"
    )]
    gpu_usage_percent: Option<f64>,
    #[serde(alias = "deviceSpecs", deserialize_with = "lenient::section")]
    device_specs: Option<DeviceSpecs>,
}

impl From<RawMetadata> for ProcessingMetadata {
    fn from(raw: RawMetadata) -> Self {
        let video = raw.video.unwrap_or_default();
        let perf = raw.performance.unwrap_or_default();

        Self {
            process_category: raw.process_category,
            model_used: raw.model_used,
            total_frames: video.total_frames.or(raw.total_frames),
            processed_frames: video.processed_frames.or(raw.processed_frames),
            duration: video.duration.or(raw.duration),
            resolution: video.resolution.or(raw.resolution),
            fps: video.fps.or(raw.fps),
            total_time: perf.total_time.or(raw.total_time),
            avg_delay_per_frame: perf.avg_delay_per_frame.or(raw.avg_delay_per_frame),
            device_used: perf.device_used.or(raw.device_used),
            cpu_usage_percent: perf.cpu_usage_percent.or(raw.cpu_usage_percent),
            gpu_usage_percent: perf.gpu_usage_percent.or(raw.gpu_usage_percent),
            device_specs: perf.device_specs.or(raw.device_specs),
        }
    }
}

/// Field deserializers that map unusable values to `None`.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Non-negative whole number; integral floats and numeric strings count.
    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        })
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Nested object; anything that does not fit is dropped.
    pub fn section<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_backend_record() {
        let value = json!({
            "timestamp": "2024-05-01T10:00:00",
            "process_category": "Low Light Enhancement",
            "model_used": "UNet",
            "video": {
                "input_file": "uploaded_videos/a.mp4",
                "total_frames": 240,
                "processed_frames": 238,
                "resolution": "1280x720",
                "fps": 24.0
            },
            "performance": {
                "total_time": 12.5,
                "avg_delay_per_frame": 0.052,
                "cpu_usage_percent": 41.5,
                "gpu_usage_percent": null,
                "device_used": "CPU",
                "device_specs": { "cpu": "x86_64", "gpu": "None" }
            },
            "status": "success"
        });

        let meta: ProcessingMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(meta.model_used.as_deref(), Some("UNet"));
        assert_eq!(meta.total_frames, Some(240));
        assert_eq!(meta.processed_frames, Some(238));
        assert_eq!(meta.device_used.as_deref(), Some("CPU"));
        assert_eq!(meta.gpu_usage_percent, None);
        assert_eq!(
            meta.device_specs.and_then(|s| s.cpu).as_deref(),
            Some("x86_64")
        );
    }

    #[test]
    fn test_flat_camel_case_record() {
        let meta: ProcessingMetadata = serde_json::from_value(json!({
            "modelUsed": "CLAHE",
            "totalFrames": 90,
            "cpuUsage": 12.0
        }))
        .unwrap();
        assert_eq!(meta.model_used.as_deref(), Some("CLAHE"));
        assert_eq!(meta.total_frames, Some(90));
        assert_eq!(meta.cpu_usage_percent, Some(12.0));
    }

    #[test]
    fn test_flattened_output_reads_back() {
        let meta = ProcessingMetadata {
            model_used: Some("UNet".into()),
            total_time: Some(3.2),
            ..Default::default()
        };
        let back: ProcessingMetadata =
            serde_json::from_str(&serde_json::to_string(&meta).unwrap()).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_empty_object() {
        let meta: ProcessingMetadata = serde_json::from_str("{}").unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn test_mistyped_fields_are_dropped() {
        let meta: ProcessingMetadata = serde_json::from_value(json!({
            "model_used": "UNet",
            "video": { "total_frames": 240.0, "processed_frames": "238", "fps": "fast" },
            "performance": {
                "cpu_usage_percent": "n/a",
                "gpu_usage_percent": "63.5",
                "total_time": [1, 2],
                "device_specs": "unknown"
            }
        }))
        .unwrap();

        assert_eq!(meta.model_used.as_deref(), Some("UNet"));
        assert_eq!(meta.total_frames, Some(240));
        assert_eq!(meta.processed_frames, Some(238));
        assert_eq!(meta.fps, None);
        assert_eq!(meta.cpu_usage_percent, None);
        assert_eq!(meta.gpu_usage_percent, Some(63.5));
        assert_eq!(meta.total_time, None);
        assert!(meta.device_specs.is_none());
    }

    #[test]
    fn test_fractional_or_negative_counts_are_dropped() {
        let meta: ProcessingMetadata = serde_json::from_value(json!({
            "total_frames": 12.5,
            "processed_frames": -3
        }))
        .unwrap();
        assert_eq!(meta.total_frames, None);
        assert_eq!(meta.processed_frames, None);
    }

    #[test]
    fn test_from_value_tolerates_non_objects() {
        assert!(ProcessingMetadata::from_value(json!("done")).is_empty());
        assert!(ProcessingMetadata::from_value(json!({ "video": 3 })).is_empty());
        assert_eq!(
            ProcessingMetadata::from_value(json!({ "modelUsed": "CLAHE" }))
                .model_used
                .as_deref(),
            Some("CLAHE")
        );
    }
}
