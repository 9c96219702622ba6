//! Subcommand handlers.

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use tracing::info;

use venh_client::{ClientConfig, EnhanceClient};
use venh_models::ProcessingRequest;
use venh_session::{ProcessingController, SessionConfig};

use crate::args::{Cli, Command, ProcessArgs};
use crate::render::{
    fmt_bytes, fmt_opt, metadata_rows, method_entries, print_rows, progress_line, RunSummary,
};

/// Shared state for one invocation.
pub struct Context {
    pub client: EnhanceClient,
    pub json: bool,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &cli.api_url {
            config = config.with_base_url(url.clone());
        }
        let client = EnhanceClient::new(config).context("Failed to create backend client")?;
        Ok(Self {
            client,
            json: cli.json,
        })
    }
}

/// Dispatch the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::from_cli(&cli)?;
    match &cli.command {
        Command::Process(args) => process(&ctx, args).await,
        Command::Methods => methods(&ctx),
        Command::Health => health(&ctx).await,
        Command::Status { job_id } => status(&ctx, job_id).await,
        Command::Metadata { filename } => metadata(&ctx, filename).await,
    }
}

/// Read a video file into an upload request.
pub async fn load_request(path: &Path) -> Result<ProcessingRequest> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("Input path has no file name")?;
    Ok(ProcessingRequest::new(file_name, data))
}

async fn process(ctx: &Context, args: &ProcessArgs) -> Result<()> {
    let request = load_request(&args.input).await?;
    let output = args.output_path();

    info!(
        input = %args.input.display(),
        output = %output.display(),
        method = %args.method,
        "Processing video"
    );

    let controller = ProcessingController::with_client(ctx.client.clone(), SessionConfig::from_env());
    let mut updates = controller.subscribe();
    let wait = controller.start(request, &args.method).wait();
    tokio::pin!(wait);

    let outcome = loop {
        tokio::select! {
            outcome = &mut wait => break outcome,
            Ok(()) = updates.changed() => {
                if !ctx.json {
                    let state = updates.borrow_and_update();
                    eprint!("\r{}", progress_line(&state.stats));
                }
            }
        }
    };
    if !ctx.json {
        eprintln!();
    }

    let state = controller.snapshot();
    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            if ctx.json {
                let summary = RunSummary {
                    status: state.status,
                    method: state.method,
                    output: None,
                    bytes: None,
                    stats: state.stats,
                    metadata: None,
                    error: state.error.as_deref(),
                };
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            bail!("Processing failed: {}", e);
        }
    };

    tokio::fs::write(&output, &result.video)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if ctx.json {
        let summary = RunSummary {
            status: state.status,
            method: state.method,
            output: Some(&output),
            bytes: Some(result.size()),
            stats: state.stats,
            metadata: result.metadata.as_ref(),
            error: None,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Saved {} ({}) using {}",
        output.display(),
        fmt_bytes(result.size()),
        fmt_opt(state.method)
    );
    if let Some(elapsed) = state.elapsed() {
        println!("Finished in {:.2}s", elapsed.num_milliseconds() as f64 / 1000.0);
    }
    println!();
    match result.metadata.as_ref().filter(|m| !m.is_empty()) {
        Some(metadata) => print_rows(&metadata_rows(Some(metadata))),
        None => println!("No processing metadata reported"),
    }
    Ok(())
}

fn methods(ctx: &Context) -> Result<()> {
    let entries = method_entries();
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in entries {
        println!("{:<12} {:<28} -> {}", entry.id, entry.name, entry.backend);
        for sub in entry.sub_methods {
            println!("{:<12}   {}", "", sub);
        }
    }
    Ok(())
}

async fn health(ctx: &Context) -> Result<()> {
    let healthy = ctx
        .client
        .health_check()
        .await
        .context("Health check failed")?;

    if ctx.json {
        println!("{}", serde_json::json!({ "healthy": healthy }));
    } else {
        println!("{}", if healthy { "healthy" } else { "unhealthy" });
    }

    if !healthy {
        bail!("Backend reported unhealthy");
    }
    Ok(())
}

async fn status(ctx: &Context, job_id: &str) -> Result<()> {
    let status = ctx
        .client
        .processing_status(job_id)
        .await
        .with_context(|| format!("Failed to fetch status for {}", job_id))?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    print_rows(&[
        ("Job", job_id.to_string()),
        ("Status", status.status.clone()),
        ("Progress", status.progress.map_or_else(|| "N/A".to_string(), |p| format!("{:.0}%", p))),
        ("Message", fmt_opt(status.message.as_deref())),
    ]);
    Ok(())
}

async fn metadata(ctx: &Context, filename: &str) -> Result<()> {
    let Some(metadata) = ctx.client.video_metadata(filename).await else {
        bail!("No metadata found for {}", filename);
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    let mut rows = metadata_rows(Some(&metadata));
    rows.push(("Resolution", fmt_opt(metadata.resolution.as_deref())));
    rows.push(("FPS", fmt_opt(metadata.fps)));
    print_rows(&rows);
    Ok(())
}
