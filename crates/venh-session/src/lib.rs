//! Processing runs for the video enhancement client.
//!
//! This crate provides:
//! - The run controller (single owner of the observable run state)
//! - Simulated per-frame progress shown while the backend works
//! - Session configuration and structured run logging

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod simulator;

pub use config::SessionConfig;
pub use controller::{ProcessingController, RunHandle};
pub use error::{SessionError, SessionResult};
pub use logging::RunLogger;
pub use simulator::{estimate_frames, ProgressSimulator, SimulationPlan};
