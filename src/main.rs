//! markdown-bridge CLI
//!
//! Converts HTML from a file or stdin to Markdown on stdout.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use markdown_bridge::{ConversionOptions, LazyConverter};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Parser)]
#[command(name = "markdown-bridge", version, about = "Convert HTML to Markdown")]
struct Cli {
    /// HTML file to convert; reads stdin when omitted or `-`
    input: Option<PathBuf>,

    /// JSON file with conversion options
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Base URL for resolving relative links and images
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Log pipeline details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("warning: {e:#}");
    }
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut options = match &cli.options {
        Some(path) => ConversionOptions::from_json_file(path)?,
        None => ConversionOptions::default(),
    };
    if let Some(base_url) = cli.base_url {
        options = options
            .to_builder()
            .base_url(base_url)
            .build()
            .context("invalid --base-url")?;
    }

    let html = read_input(cli.input.as_deref())?;
    debug!(html_bytes = html.len(), "read input");

    let markdown = LazyConverter::with_options(options)
        .convert(&html)
        .await
        .context("conversion failed")?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{markdown}").context("failed to write output")?;
    Ok(())
}

fn read_input(path: Option<&std::path::Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut html = String::new();
            std::io::stdin()
                .read_to_string(&mut html)
                .context("failed to read stdin")?;
            Ok(html)
        }
    }
}

/// `log` records go through env_logger, `tracing` events through a fmt layer;
/// both honor `RUST_LOG` and write to stderr
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .try_init()
        .context("failed to initialize env_logger")?;

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        );
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;
    Ok(())
}
