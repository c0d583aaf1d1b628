//! DermaVision - skin-lesion classification demo
//!
//! Entry point for the web service and its maintenance commands.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dermavision_core::{
    analyze, ApiServer, AppConfig, AppState, Classifier, FeedbackLedger, InferenceAdapter,
    SubmissionContext,
};
use tracing::{debug, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "dermavision")]
#[command(about = "Skin-lesion classification demo service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file (TOML)
    #[arg(short, long, env = "DERMAVISION_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (default)
    Serve {
        /// Server address (overrides the configured bind_addr)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },

    /// Classify one image and print the enriched result as JSON
    Classify {
        /// Image file (png, jpg, jpeg)
        image: PathBuf,

        /// Patient age for the age note
        #[arg(long)]
        age: Option<i64>,
    },

    /// Inspect the feedback ledger
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum FeedbackAction {
    /// Print every feedback row in insertion order
    List,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (secret redacted)
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::new(format!(
        "dermavision={level},dermavision_core={level},tower_http={level}",
        level = cli.log_level.to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("DermaVision v{} starting...", env!("CARGO_PKG_VERSION"));

    // Configuration errors are the only fatal startup failure
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Serve { addr } => serve(config, addr).await,
        Commands::Classify { image, age } => classify(config, image, age).await,
        Commands::Feedback {
            action: FeedbackAction::List,
        } => list_feedback(config).await,
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            print!("{}", config.to_redacted_toml()?);
            Ok(())
        }
    }
}

async fn serve(mut config: AppConfig, addr: Option<SocketAddr>) -> anyhow::Result<()> {
    if let Some(addr) = addr {
        config.bind_addr = addr;
    }

    let adapter = Arc::new(InferenceAdapter::onnx(&config));
    match adapter.warm_up().await {
        Ok(()) => info!("Model loaded."),
        Err(e) => warn!("Model load failed at startup (will retry on first request): {}", e),
    }

    let state = AppState::new(config, adapter)?;
    state.ensure_dirs().await?;

    ApiServer::new(state).serve().await
}

async fn classify(config: AppConfig, image: PathBuf, age: Option<i64>) -> anyhow::Result<()> {
    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let uploads = dermavision_core::UploadStore::new(&config);
    uploads.validate_filename(&name)?;

    let bytes = tokio::fs::read(&image)
        .await
        .with_context(|| format!("cannot read {}", image.display()))?;

    let adapter = InferenceAdapter::onnx(&config);
    let context = SubmissionContext {
        age,
        ..SubmissionContext::default()
    };
    let result = analyze(&adapter as &dyn Classifier, &name, &bytes, context).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn list_feedback(config: AppConfig) -> anyhow::Result<()> {
    let ledger = FeedbackLedger::new(&config);
    let rows = ledger.list_all().await?;

    if rows.is_empty() {
        println!("No feedback recorded in {}", ledger.path().display());
        return Ok(());
    }

    for row in rows {
        println!("[{}] {} <{}>", row.timestamp, row.name, row.email);
        println!("    {}", row.message.replace('\n', "\n    "));
    }
    Ok(())
}
