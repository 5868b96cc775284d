//! factcheck-relay - fact-checking relay in front of the Gemini API
//!
//! An HTTP service with a single `POST /analyze` endpoint. Submitted text is
//! wrapped in a fixed zh-TW fact-checking prompt, sent to Gemini with a
//! strict JSON response schema, and the model's findings are passed back.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup error (configuration, bind failure, etc.)

mod cli;
mod config;
mod error;
mod gemini;
mod models;
mod prompt;
mod relay;
mod server;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use gemini::GeminiClient;
use relay::AnalysisRelay;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment from .env must be visible before clap reads env-backed flags
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("factcheck-relay v{}", env!("CARGO_PKG_VERSION"));
    if dotenv_loaded {
        debug!("Loaded environment from .env");
    }

    if let Err(e) = run(args).await {
        error!("Relay failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .factcheck.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set GEMINI_API_KEY in the environment or a .env file before starting.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over `-v`/`-q` when set.
fn init_logging(args: &Args) {
    let level = LevelFilter::from_level(args.log_level());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Build the relay from configuration and serve until shutdown.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    info!("Model: {}", config.upstream.model);
    info!("Gemini API: {}", config.upstream.api_base);
    match config.upstream.timeout_seconds {
        Some(secs) => info!("Upstream timeout: {}s", secs),
        None => debug!("Upstream timeout: transport default"),
    }

    let client = GeminiClient::new(config.upstream.clone())?;
    let relay = AnalysisRelay::new(Arc::new(client));

    server::run_server(&config.bind_address(), relay).await
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location; a file that exists but does not parse is fatal
    match Config::load_default()? {
        Some(config) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
