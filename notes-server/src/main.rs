mod config;
mod dto;
mod handlers;
mod models;
mod repository;
mod service;

use std::{process::ExitCode, sync::Arc};

use config::{Config, ConfigError, StoreKind};
use handlers::rest;
use repository::{MemoryRepository, NoteRepository, PgRepository, RepositoryError};
use service::NoteService;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to prepare database: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Failed to bind to port {port}: {source}")]
    Bind {
        port: u16,
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(std::io::Error),
}

async fn open_repository(cfg: &Config) -> Result<Arc<dyn NoteRepository>, StartupError> {
    match cfg.notes_store {
        StoreKind::Memory => Ok(Arc::new(MemoryRepository::new())),
        StoreKind::Postgres => {
            let dsn = cfg.database_dsn()?;

            let mut repo = PgRepository::connect(&dsn).await?;
            repo.migrate().await?;

            Ok(Arc::new(repo))
        }
    }
}

async fn run() -> Result<(), StartupError> {
    // Load config
    let cfg = config::load_config()?;

    // Repository creation and migration
    let repo = open_repository(&cfg).await?;

    // Service creation
    let service = Arc::new(NoteService::new(repo));

    let router = rest::router(service);

    let http_listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .map_err(|source| StartupError::Bind {
            port: cfg.port,
            source,
        })?;

    match http_listener.local_addr() {
        Ok(addr) => tracing::info!("REST server starting, listening on {}", addr),
        Err(e) => tracing::warn!("REST server starting, local address unavailable: {e}"),
    }

    axum::serve(http_listener, router)
        .await
        .map_err(StartupError::Serve)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Log setup
    tracing_subscriber::fmt::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
