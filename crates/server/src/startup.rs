use std::sync::Arc;

use axum::Router;
use configs::{AppConfig, StorageBackend, StorageConfig};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, AppState};
use service::{InMemoryRecordStore, JsonFileRecordStore, RecordStore};

/// Any origin may call the API, as with the browser map client.
pub fn build_cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Open the Record Store selected by configuration.
pub async fn open_store(cfg: &StorageConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    match cfg.backend {
        StorageBackend::File => {
            common::env::ensure_parent_dir(&cfg.path).await?;
            let store: Arc<dyn RecordStore> = JsonFileRecordStore::open(&cfg.path).await?;
            Ok(store)
        }
        StorageBackend::Memory => {
            warn!("in-memory storage selected; records are lost on restart");
            let store: Arc<dyn RecordStore> = InMemoryRecordStore::new();
            Ok(store)
        }
    }
}

pub fn build_app(cfg: &AppConfig, store: Arc<dyn RecordStore>) -> Router {
    routes::build_router(AppState::new(store), build_cors(), cfg.server.max_body_bytes)
}

/// Serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let store = open_store(&cfg.storage).await?;
    let app = build_app(&cfg, store);

    let listener = TcpListener::bind(cfg.server.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, backend = ?cfg.storage.backend, "map request service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}
