//! Sitewalk main entry point
//!
//! This is the command-line interface for the Sitewalk crawler.

use clap::Parser;
use sitewalk::config::{load_config_with_hash, validate, Config};
use sitewalk::crawler::{run_crawl, CancelHandle};
use sitewalk::output::{print_report, OutputFormat};
use sitewalk::url::normalize_target;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitewalk: a bounded-depth, polite web crawler
///
/// Sitewalk walks a site breadth-first from TARGET, respects robots.txt and
/// a fixed delay between requests, and writes every visited URL to a file
/// named after the host and the start time.
#[derive(Parser, Debug)]
#[command(name = "sitewalk")]
#[command(version)]
#[command(about = "A bounded-depth, polite web crawler", long_about = None)]
struct Cli {
    /// Domain or URL to crawl (https:// is assumed when no scheme is given)
    #[arg(value_name = "TARGET")]
    target: String,

    /// Output file format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory the output file is written to [default: output]
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// User-Agent header sent with page requests [default: none]
    #[arg(short, long)]
    user_agent: Option<String>,

    /// Maximum crawl depth; the seed is depth 0 [default: 2]
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Delay before each page request, in seconds [default: 0]
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Per-request timeout, in seconds [default: 30]
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Optional TOML file with defaults for the options above
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress output (warnings and errors are still shown)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Layers command-line flags over the file (or default) configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(user_agent) = &self.user_agent {
            config.crawler.user_agent = Some(user_agent.clone());
        }
        if let Some(max_depth) = self.max_depth {
            config.crawler.max_depth = max_depth;
        }
        if let Some(delay) = self.delay {
            config.crawler.delay = delay;
        }
        if let Some(timeout) = self.timeout {
            config.crawler.request_timeout = timeout;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e);
        }
    };

    let seed = match normalize_target(&cli.target) {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!("Invalid target '{}': {}", cli.target, e);
            return Err(e.into());
        }
    };

    let cancel = CancelHandle::new();
    spawn_interrupt_handler(cancel.clone());

    match run_crawl(seed, &config, cancel).await {
        Ok(report) => {
            if !cli.quiet {
                print_report(&report);
                println!();
            }
            println!("✓ Crawl output written to: {}", report.output_path.display());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Loads the optional config file, then applies flags and validates
fn build_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    validate(&config)?;

    if !config.output.format.is_append_safe() {
        tracing::warn!(
            "{} output is only valid once the crawl finishes; use jsonl for a file that survives interruption",
            config.output.format
        );
    }

    tracing::debug!(
        "Max depth: {}, delay: {}s, timeout: {}s, format: {}, output dir: {}",
        config.crawler.max_depth,
        config.crawler.delay,
        config.crawler.request_timeout,
        config.output.format,
        config.output.directory.display()
    );

    Ok(config)
}

/// Cancels the crawl on the first Ctrl-C and exits on the second
fn spawn_interrupt_handler(cancel: CancelHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("Interrupt received; stopping after the current page (Ctrl-C again to abort)");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("Aborted; output file may be incomplete");
            std::process::exit(130);
        }
    });
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Errors and per-URL warnings only
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("sitewalk=info,warn"),
            1 => EnvFilter::new("sitewalk=debug,info"),
            2 => EnvFilter::new("sitewalk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
