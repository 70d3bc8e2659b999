use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use faq_chat::config::parse_models;
use faq_chat::{AppConfig, AppState, server};
use tracing_subscriber::EnvFilter;

/// faq-chat - answers questions about an FAQ dataset through a chat-completion API
#[derive(Parser)]
#[command(name = "faq-chat")]
#[command(about = "Answers questions about an FAQ dataset through a chat-completion API")]
#[command(version)]
struct Cli {
    /// Address to bind to (overrides HOST)
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// CSV dataset to answer from (overrides DATASET_PATH)
    #[arg(short, long, value_name = "PATH")]
    dataset: Option<PathBuf>,

    /// Comma-separated models in priority order (overrides CHAT_MODELS)
    #[arg(short, long, value_name = "MODELS")]
    models: Option<String>,
}

fn main() {
    // A missing .env file is fine; variables may come from the environment
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        let message = format!("{e:#}");
        tracing::error!(error = %message, "Startup failed");
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Builds the application state, then serves until shutdown.
///
/// State is built before the async runtime starts and released after it
/// stops, since it owns a blocking HTTP client.
fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    let config = apply_overrides(config, cli)?;
    tracing::info!(?config, "Configuration loaded");

    let state = Arc::new(AppState::initialize(&config).context("Failed to initialize service")?);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::serve(Arc::clone(&state), &config.host, config.port))?;
    drop(runtime);

    // Last reference goes here, outside the runtime
    drop(state);
    Ok(())
}

/// Applies command-line flags on top of the environment configuration.
fn apply_overrides(mut config: AppConfig, cli: &Cli) -> Result<AppConfig> {
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dataset) = &cli.dataset {
        config.dataset_path = dataset.clone();
    }
    if let Some(models) = &cli.models {
        let models = parse_models(models);
        if models.is_empty() {
            anyhow::bail!("--models must name at least one model");
        }
        config.models = models;
    }
    Ok(config)
}
