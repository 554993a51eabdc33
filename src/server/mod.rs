//! Crop yield prediction server
//!
//! Trains the model once at startup and serves health, prediction and dataset preview
//! endpoints over HTTP.

mod api;
mod error;
mod state;
mod handlers;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::training::ModelConfig;

/// Bundled sample dataset, relative to the crate root
pub const DEFAULT_DATASET: &str = "data/crop_yield_samples.csv";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub dataset_path: PathBuf,
    pub model: ModelConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),
            dataset_path: std::env::var("CROP_DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| Self::resolve_default_dataset()),
            model: ModelConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Resolve the bundled dataset against the working directory, then the crate root.
    fn resolve_default_dataset() -> PathBuf {
        let candidates = [
            PathBuf::from(DEFAULT_DATASET),
            Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_DATASET),
        ];

        candidates
            .iter()
            .find(|p| p.exists())
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET))
    }

    pub fn with_dataset(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = path.into();
        self
    }
}

/// Load, train and serve until ctrl-c
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        dataset = %config.dataset_path.display(),
        n_estimators = config.model.n_estimators,
        random_state = config.model.random_state,
        started_at = %start_time.to_rfc3339(),
        "Initializing model"
    );

    let init_config = config.clone();
    let state = tokio::task::spawn_blocking(move || AppState::initialize(init_config)).await??;
    info!(
        records = state.dataset.len(),
        dataset = %state.dataset.file_name(),
        n_trees = state.model.n_trees(),
        "Model ready"
    );

    let app = create_router(Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");
    info!(url = %format!("http://{}/health", addr), "Health endpoint available");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install ctrl-c handler, graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
