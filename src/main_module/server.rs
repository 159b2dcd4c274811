//! HTTP server initialization and routing

use axum::http::Method;
use axum::{routing::get, Router};
use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::configure_api_routes;
use crate::config::AppConfig;
use crate::crm::CrmStore;
use crate::shared::state::AppState;

use super::{health_check, shutdown_signal};

pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .merge(configure_api_routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Loads the price list and the CRM snapshot. A defective price list is a
/// startup failure.
pub async fn build_state(config: AppConfig) -> anyhow::Result<Arc<AppState>> {
    let pricing = config.pricing_table()?;

    let mut store = match &config.data_path {
        Some(path) => CrmStore::load_from_file(path).await?,
        None => {
            warn!("CRM_DATA_PATH not set, starting with an empty snapshot");
            CrmStore::default()
        }
    };

    if config.recompute_on_start {
        let report = store.recompute_potentials(&pricing);
        info!("Startup recompute updated {} potentials", report.updated_count);
    }

    Ok(AppState::new(config, pricing, store))
}

pub async fn run_server(state: Arc<AppState>) -> std::io::Result<()> {
    let host = state.config.server.host.clone();
    let port = state.config.server.port;
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{host}:{port}: {e}")))?;

    let app = create_app(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}
