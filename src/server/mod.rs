//! HTTP front end.
//!
//! Exposes the agent over three routes:
//!
//! | Method | Path                  | Purpose                          |
//! |--------|-----------------------|----------------------------------|
//! | POST   | `/ask_agent/`         | `{prompt}` → response envelope   |
//! | GET    | `/reports/{filename}` | download a generated report      |
//! | GET    | `/`                   | liveness message                 |

mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::agent::Orchestrator;

pub use routes::{AskRequest, ErrorBody};

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    reports_dir: PathBuf,
    public_base_url: String,
}

impl AppState {
    /// Creates the state; reports directory and public URL come from the
    /// orchestrator's configuration.
    #[must_use]
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let reports_dir = orchestrator.config().reports_dir.clone();
        let public_base_url = orchestrator.config().public_base_url.clone();
        Self {
            orchestrator,
            reports_dir,
            public_base_url,
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/ask_agent/", post(routes::ask_agent))
        .route("/reports/{filename}", get(routes::download_report))
        .with_state(state)
}

/// Serves on an already bound listener until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve_on(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

/// Binds `addr` and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "clinic agent listening");

    let ct = CancellationToken::new();
    let signal = ct.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        signal.cancel();
    });

    serve_on(listener, state, ct).await
}
