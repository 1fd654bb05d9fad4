//! HTTP surface of the migration analysis chatbot.
//!
//! [`start`] wires configuration, the MongoDB store and the Gemini client into
//! one [`core::session::SessionController`] and serves it with axum.

use std::sync::Arc;

pub mod core;
mod error_handler;
mod middleware_layer;
mod routes;

pub use error_handler::{AppError, AppResult};

use ai_llm_service::{GeminiService, HealthService, TextCompletion};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use migration_store::{MigrationStore, MongoMigrationStore};
use tokio::signal;
use tracing::{error, info};

use crate::{
    core::app_state::{AppConfig, AppState},
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        chat::chat_route::{chat_route, transcript_route},
        filters::filters_route::filters_route,
        health::health_route::health_route,
        reports::reports_route::{
            generate_report_route, latest_report_route, report_data_route, report_pdf_route,
        },
    },
};

/// Boots the server and blocks until Ctrl+C.
///
/// Missing year data or an empty country list at startup is fatal: nothing
/// is served.
pub async fn start() -> Result<(), AppError> {
    let cfg = AppConfig::from_env()?;

    let store: Arc<dyn MigrationStore> =
        Arc::new(MongoMigrationStore::connect(&cfg.store).await?);
    let llm: Arc<dyn TextCompletion> = Arc::new(GeminiService::new(cfg.llm.clone())?);
    let health = HealthService::new(None)?;

    let state = Arc::new(AppState::new(store, llm, cfg.llm.clone(), health));

    let options = state.session.filter_options().await.map_err(|e| {
        error!(error = %e, "startup data check failed");
        AppError::Startup(e)
    })?;
    info!(
        countries = options.countries.len(),
        min_year = options.year_bounds.min,
        max_year = options.year_bounds.max,
        model = %cfg.llm.model,
        "startup data check passed"
    );

    let listener = tokio::net::TcpListener::bind(&cfg.address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %cfg.address, "API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)
}

/// All routes over shared state, with JSON rejection mapping.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/filters", get(filters_route))
        .route("/reports", post(generate_report_route))
        .route("/reports/latest", get(latest_report_route))
        .route("/reports/latest/pdf", get(report_pdf_route))
        .route("/reports/latest/data", get(report_data_route))
        .route("/chat", get(transcript_route).post(chat_route))
        .route("/health", get(health_route))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
