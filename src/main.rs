use anyhow::Result;
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod store;
mod transform;

use config::StoreBackend;
use services::gallery::GalleryService;
use store::{GalleryStore, memory::MemoryStore, sqlite::SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting picstash with config: {:?}", cfg);

    // --- Pick the store backend ---
    let store: Arc<dyn GalleryStore> = match cfg.backend {
        StoreBackend::Memory => {
            if migrate {
                tracing::info!("In-memory backend needs no migrations.");
                return Ok(());
            }
            tracing::warn!("In-memory backend selected; data will not survive a restart.");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Sqlite => {
            let db_url = &cfg.database_url;
            tracing::debug!("Connecting using raw URL => {}", db_url);

            // Extract the local file path SQLx will use
            let db_path = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("file:");
            tracing::debug!("Interpreted SQLite path => {}", db_path);

            // Create parent directory if needed
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent)?;
                    tracing::info!("Created missing directory {:?}", parent);
                }
            }

            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await?;

            // --- Handle migration mode ---
            if migrate {
                store::sqlite::run_migrations(&pool).await?;
                tracing::info!("Database migration complete.");
                return Ok(()); // exit after migration
            }

            Arc::new(SqliteStore::new(Arc::new(pool)))
        }
    };

    // --- Initialize core service ---
    let service = GalleryService::new(store, cfg.public_base_url.clone(), cfg.max_upload_bytes);

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(service);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
