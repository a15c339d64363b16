//! HTTP API for the discovery core.
//!
//! A thin JSON surface over the query composer and the pin store; routing
//! stays deliberately dumb so the core modules own all semantics.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::client::OpenAlexClient;
use crate::query::QueryComposer;
use crate::store::PinStore;

/// Shared application state, constructed once at startup and injected into
/// every handler. The pin store has a single logical writer per session,
/// guarded by the lock.
pub struct AppState {
    /// Graph client handle.
    pub client: Arc<OpenAlexClient>,

    /// Query composer over the same client.
    pub composer: QueryComposer,

    /// The canonical pin collection.
    pub store: RwLock<PinStore>,
}

impl AppState {
    /// Assemble the state from its parts.
    #[must_use]
    pub fn new(client: Arc<OpenAlexClient>, store: PinStore) -> Self {
        let composer = QueryComposer::new(Arc::clone(&client));
        Self { client, composer, store: RwLock::new(store) }
    }
}

/// Build the API router with cors and request tracing.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> axum::Router {
    routes::api_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until ctrl-c.
///
/// # Errors
///
/// Returns error on bind or server failure.
pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let router = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("API server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("API server shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C handler");
    tracing::info!("Received shutdown signal");
}
