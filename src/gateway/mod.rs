//! HTTP gateway
//!
//! Axum router exposing upload and line queries over the file store.

pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{Config, GatewayConfig};
use crate::files::{FileIndex, FileStorage};

pub use error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<FileStorage>,
    pub index: FileIndex,
    pub rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    pub fn new(storage: FileStorage, index: FileIndex, rng: StdRng) -> Self {
        Self {
            storage: Arc::new(storage),
            index,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Open the blob directory and index named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let data_dir = config.storage.data_path();
        let index = FileIndex::new(&data_dir)
            .with_context(|| format!("Failed to open file index in {}", data_dir.display()))?;
        let storage = FileStorage::new(config.storage.files_path());
        let rng = match config.gateway.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::new(storage, index, rng))
    }
}

/// Build the router with every route and the request limits.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/upload", post(handlers::upload))
        .route("/upload/", post(handlers::upload))
        .route("/random-line", get(handlers::random_line))
        .route("/random-line/", get(handlers::random_line))
        .route("/random-line-backwards", get(handlers::random_line_backwards))
        .route("/random-line-backwards/", get(handlers::random_line_backwards))
        .route("/longest-100", get(handlers::longest_100))
        .route("/longest-100/", get(handlers::longest_100))
        .route("/longest-20/{file_id}", get(handlers::longest_20))
        .route("/longest-20/{file_id}/", get(handlers::longest_20))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listen address and serve until Ctrl-C or SIGTERM.
pub async fn run(config: &Config) -> Result<()> {
    let addr: SocketAddr = config
        .gateway
        .listen_addr
        .parse()
        .context("Invalid gateway listen address")?;

    let state = AppState::from_config(config)?;
    info!(
        data_dir = %config.storage.data_path().display(),
        files = state.index.count()?,
        "File store ready"
    );
    let app = build_router(state, &config.gateway);

    let listener = TcpListener::bind(&addr)
        .await
        .context("Failed to bind gateway")?;
    info!("Gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server error")?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
