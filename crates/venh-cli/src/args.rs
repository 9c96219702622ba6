//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Enhance videos with a remote processing backend.
#[derive(Debug, Parser)]
#[command(name = "venh", version, about)]
pub struct Cli {
    /// Backend API base URL (including the /api prefix)
    #[arg(long, global = true, env = "VENH_API_URL")]
    pub api_url: Option<String>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a video and save the enhanced result
    Process(ProcessArgs),
    /// List the available enhancement methods
    Methods,
    /// Check whether the backend is reachable
    Health,
    /// Show the status of a backend job
    Status {
        /// Backend job identifier
        job_id: String,
    },
    /// Show stored metadata for a processed file
    Metadata {
        /// File name as known to the backend
        filename: String,
    },
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Input video file
    pub input: PathBuf,

    /// Enhancement method (e.g. clahe, unet, glare, automatic)
    #[arg(short, long, default_value = "clahe")]
    pub method: String,

    /// Output file (default: <input>_enhanced.mp4)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ProcessArgs {
    /// Output path, derived from the input when not given.
    pub fn output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let stem = self
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("video");
        self.input.with_file_name(format!("{}_enhanced.mp4", stem))
    }
}
