//! PlantOps - Main Server
//!
//! Maintenance-operations server with Neo4j and Meilisearch.

use anyhow::Result;
use clap::{Parser, Subcommand};
use plantops::map::MirrorReconciler;
use plantops::{AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "plantops")]
#[command(about = "PlantOps Maintenance Operations Server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Run a one-shot mirror reconciliation sweep and exit
    Reconcile,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,plantops=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port } => {
            config.server_port = port;
            plantops::start_server(config).await
        }
        Commands::Reconcile => run_reconcile(config).await,
    }
}

async fn run_reconcile(config: Config) -> Result<()> {
    let state = AppState::new(config).await?;
    tracing::info!("Connected to databases");

    let reconciler = MirrorReconciler::new(state.store.clone(), state.mirror.clone());
    let report = reconciler.reconcile_all().await?;

    tracing::info!(
        "Reconcile complete: {} tenants, {} repaired, {} failed",
        report.tenants,
        report.repaired,
        report.failed
    );

    Ok(())
}
