//! Client for the video enhancement backend.
//!
//! This crate uploads a video together with the backend method identifier
//! and normalizes the two response shapes the backend produces (raw video
//! bytes, or JSON pointing at the video plus run metadata).

pub mod client;
pub mod error;
pub mod processor;
pub mod types;

pub use client::{ClientConfig, EnhanceClient};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use processor::VideoProcessor;
pub use types::{ProcessingStatus, ResponseShape};
