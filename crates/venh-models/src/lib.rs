//! Shared data models for the video enhancement client.
//!
//! This crate provides Serde-serializable types for:
//! - Enhancement methods and backend method resolution
//! - Upload requests and processing results
//! - Simulated per-frame samples and their running statistics
//! - Run lifecycle state shared with read-only consumers

pub mod frame;
pub mod metadata;
pub mod method;
pub mod request;
pub mod run;

// Re-export common types
pub use frame::{FrameSample, ProcessingStats};
pub use metadata::{DeviceSpecs, ProcessingMetadata};
pub use method::{resolve_method, BackendMethod, EnhancementMethod, ParseMethodError, SubMethod};
pub use request::{ProcessingRequest, ProcessingResult};
pub use run::{RunId, RunState, RunStatus};
