//! GET /health: store ping plus model probe.

use std::{sync::Arc, time::Instant};

use ai_llm_service::HealthStatus;
use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub store: StoreHealth,
    pub model: HealthStatus,
}

/// `200` when both dependencies answer, `503` otherwise. Never fails itself.
#[instrument(name = "health_route", skip(state))]
pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let started = Instant::now();
    let store = match state.store.ping().await {
        Ok(()) => StoreHealth {
            ok: true,
            latency_ms: started.elapsed().as_millis(),
            message: "ok".into(),
        },
        Err(err) => {
            warn!(error = %err, "health_route: store ping failed");
            StoreHealth {
                ok: false,
                latency_ms: started.elapsed().as_millis(),
                message: err.to_string(),
            }
        }
    };

    let model = state.health.check(&state.llm_config).await;
    let ok = store.ok && model.ok;
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    ApiResponse::success(HealthResponse { ok, store, model }).into_response_with_status(status)
}
