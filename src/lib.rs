pub mod config;
pub mod db;
pub mod errors;
pub mod http;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

use std::{net::SocketAddr, sync::Arc};

use axum::{Router, middleware as axum_middleware};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    db::{MovieStore, PgStore},
    errors::AppError,
    middleware::{bearer_auth_middleware, cors_layer},
    services::{BoxOfficeClient, EnrichmentQueue},
    state::AppState,
};

/// Assembles the full HTTP application around `state`, including the bearer gate.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(http::create_http_routes(state.clone()))
        .fallback(|| async { AppError::NotFound("Route not found".into()) })
        .layer(axum_middleware::from_fn_with_state(
            state,
            bearer_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store: Arc<dyn MovieStore> = Arc::new(PgStore::connect(&config.db_url).await?);

    let box_office = BoxOfficeClient::new(&config.box_office_url, &config.box_office_api_key)
        .map_err(|e| AppError::EnvError(format!("Failed to build box office client: {}", e)))?;

    let enrichment = EnrichmentQueue::start(
        store.clone(),
        Arc::new(box_office),
        config.enrichment_queue_size,
        config.enrichment_workers,
    );

    let state = AppState::new(store, enrichment, &config.auth_token, &config.base_url);

    let app = build_app(state).layer(cors_layer());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind {}: {}", addr, e);
        AppError::InternalError
    })?;

    tracing::info!("Movie catalog server running at {}", config.base_url);

    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        AppError::InternalError
    })
}
