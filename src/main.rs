// Command-line front end for the document optimizer.
// The library (lib.rs) holds the pipeline; this file only wires flags, logging and Ctrl-C.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use doc_optimizer_lib::utils::derive_output_path;
use doc_optimizer_lib::{
    DocumentJob, JobEvent, JobOutcome, JobSettings, OptimizerConfig, OptimizerError, VERSION, submit,
};

/// Recompress the images embedded in a Word document.
#[derive(Parser, Debug)]
#[command(name = "doc-optimizer", version, about)]
struct Cli {
    /// Word document to compress (.docx or .doc)
    input: PathBuf,

    /// Output document (default: <output-dir>/compressed_<input name>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for the derived output name (default: the input's directory)
    #[arg(long, env = "DOC_OPTIMIZER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// JPEG quality, 1-100 (default from config, 75)
    #[arg(short, long, env = "DOC_OPTIMIZER_QUALITY", value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// JSON config file
    #[arg(short, long, env = "DOC_OPTIMIZER_CONFIG")]
    config: Option<PathBuf>,

    /// Fail when the document has no media directory
    #[arg(long)]
    require_media_dir: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, env = "DOC_OPTIMIZER_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    info!("=== doc-optimizer {VERSION} ===");

    let mut config = match &cli.config {
        Some(path) => OptimizerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => OptimizerConfig::default(),
    };
    if cli.require_media_dir {
        config.require_media_dir = true;
    }
    debug!("Effective config: {config:?}");

    let quality = cli.quality.unwrap_or(config.default_quality);
    let output = cli.output.clone().unwrap_or_else(|| {
        derive_output_path(&cli.input, cli.output_dir.as_deref(), &config.output_prefix)
    });

    let job = DocumentJob::new(&cli.input, &output, JobSettings { quality });
    let mut handle = submit(job, Arc::new(config));

    let mut cancel_requested = false;
    let outcome = loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(JobEvent::Progress(progress)) => {
                    info!("[{:>3}%] {}", progress.progress_percentage, progress.status);
                }
                Some(JobEvent::Complete(outcome)) => break outcome,
                None => break JobOutcome::failed(&OptimizerError::pipeline("worker exited without a result")),
            },
            _ = tokio::signal::ctrl_c(), if !cancel_requested => {
                warn!("Cancellation requested, finishing the current image");
                handle.cancel();
                cancel_requested = true;
            }
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.message);
    }

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false)
        .compact();

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}
