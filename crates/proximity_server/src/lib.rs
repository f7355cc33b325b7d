//! Proximity HTTP Server
//!
//! A thin HTTP wrapper around `proximity_core`:
//!
//! - `POST /location` records the caller's position at the current second
//! - `GET /neighbours` lists entities near the caller recently, with trails
//! - `GET /health` reports liveness and the number of tracked entities
//!
//! The caller identifies itself with the `X-User-Id` header.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{LogFormat, ServerConfig};
pub use error::{Result, ServerError};
pub use state::AppState;
pub use telemetry::{init_logging, TelemetryConfig};

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct ProximityServer {
    state: Arc<AppState>,
    router: Router,
}

impl ProximityServer {
    pub fn new(config: ServerConfig) -> Result<Self> {
        Ok(Self::from_state(Arc::new(AppState::new(config)?)))
    }

    pub fn from_state(state: Arc<AppState>) -> Self {
        let router = routes::build_router(state.clone());
        Self { state, router }
    }

    /// Router with every route and the shared state attached.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until ctrl-c.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let addr = self.state.config.listen_addr;
        let listener = TcpListener::bind(addr).await?;
        let retention_task = spawn_retention_task(self.state.clone());

        info!(
            addr = %addr,
            storage = self.state.config.storage_type_str(),
            retention_secs = ?self.state.config.retention_secs,
            "Proximity server starting"
        );

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        if let Some(task) = retention_task {
            task.abort();
        }
        result
    }
}

/// Periodically drop samples past the configured retention. Returns `None`
/// when retention is not configured.
pub fn spawn_retention_task(state: Arc<AppState>) -> Option<JoinHandle<()>> {
    let retention_secs = state.config.retention_secs?;
    let period = Duration::from_secs(state.config.prune_interval_secs.max(1));

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let now = state.clock.now();
            let service = state.service.clone();
            match tokio::task::spawn_blocking(move || service.prune_expired(now, retention_secs)).await {
                Ok(Ok(removed)) => info!(
                    component = "retention",
                    event = "samples_pruned",
                    now,
                    retention_secs,
                    removed,
                    "Retention sweep finished"
                ),
                Ok(Err(error)) => warn!(component = "retention", error = %error, "Retention sweep failed"),
                Err(error) => warn!(component = "retention", error = %error, "Retention sweep panicked"),
            }
        }
    }))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(error = %error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
