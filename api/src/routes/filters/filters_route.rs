//! GET /filters: sidebar options from live data.

use std::sync::Arc;

use axum::{extract::State, response::Response};
use tracing::{debug, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
};

/// Countries, year bounds, default selection and report kinds.
///
/// # Example
/// ```bash
/// curl http://127.0.0.1:8080/filters
/// ```
#[instrument(name = "filters_route", skip(state))]
pub async fn filters_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let options = state.session.filter_options().await?;
    debug!(
        countries = options.countries.len(),
        min_year = options.year_bounds.min,
        max_year = options.year_bounds.max,
        "filters_route: loaded"
    );
    Ok(ApiResponse::success(options).ok())
}
