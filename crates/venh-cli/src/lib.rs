//! Command-line front-end for the video enhancement backend.

pub mod args;
pub mod commands;
pub mod render;

pub use args::{Cli, Command, ProcessArgs};
pub use commands::run;
