//! skumap-link - POS/WEB catalog linkage tool
//!
//! `serve` (default) ingests the feeds and starts the operator API;
//! `ingest` and `export` run one step and exit.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skumap_common::config::{resolve_root_folder, TomlConfig, ROOT_FOLDER_ENV};
use skumap_common::db::init_database;
use skumap_common::CatalogStore;
use skumap_link::ingest::{ingest_all, FeedSources};
use skumap_link::{build_router, export, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for skumap-link
#[derive(Parser, Debug)]
#[command(name = "skumap-link")]
#[command(about = "Link POS and WEB catalog records and export the SKU mapping")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SKUMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database, feeds and export
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on (serve only)
    #[arg(short, long, env = "SKUMAP_PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the operator API (default)
    Serve {
        /// Keep the current POS/WEB tables instead of reloading the feeds
        #[arg(long)]
        skip_ingest: bool,
    },
    /// Reload POS and WEB from the feeds, then exit
    Ingest,
    /// Write the WEB-to-POS mapping from MERGED, then exit
    Export {
        /// Output file (defaults to the configured export file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting skumap-link v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_source.log();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, &config);
    let paths = config.resolve_paths(&root_folder);
    info!("Root folder: {}", paths.root_folder.display());
    info!("Database path: {}", paths.database_path.display());

    let pool = init_database(&paths.database_path)
        .await
        .context("Failed to open catalog database")?;
    let store = CatalogStore::new(pool);
    let feeds = FeedSources::from_config(&config, &paths);

    match args.command.unwrap_or(Command::Serve { skip_ingest: false }) {
        Command::Ingest => {
            let report = ingest_all(&store, &feeds).await.context("Ingestion failed")?;
            info!(
                "POS: {} of {} rows kept; WEB: {} of {} rows kept",
                report.pos.kept, report.pos.read, report.web.kept, report.web.read
            );
        }
        Command::Export { output } => {
            let path = output.unwrap_or(paths.export_path);
            let summary = export::export_to_path(&store, &path).await.context("Export failed")?;
            info!("Wrote {} rows to {}", summary.rows, summary.path.display());
        }
        Command::Serve { skip_ingest } => {
            if skip_ingest {
                info!("Skipping feed ingestion");
            } else if let Err(e) = ingest_all(&store, &feeds).await {
                // Existing tables stay usable; the operator can retry via POST /api/ingest
                warn!("Feed ingestion failed, serving current tables: {}", e);
            }

            let state = AppState::new(store, feeds, paths.export_path)
                .await
                .context("Failed to open link session")?;
            serve(state, args.port.unwrap_or(config.port)).await?;
        }
    }

    Ok(())
}

async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("skumap-link listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
