//! Report generation and retrieval.
//!
//! - POST /reports             generate from the sidebar selection
//! - GET  /reports/latest      metadata and text of the last report
//! - GET  /reports/latest/pdf  the PDF as an attachment
//! - GET  /reports/latest/data records behind the last report, by year

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use report_engine::PDF_MIME;
use tracing::{info, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::reports::{
        report_request::ReportRequest,
        report_response::{ReportDataResponse, ReportResponse},
    },
};

/// Handler: POST /reports
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/reports \
///   -H 'content-type: application/json' \
///   -d '{"countries":["Syria","Iraq"],"year_from":2018,"year_to":2023,"kind":"hotspot_prediction"}'
/// ```
#[instrument(name = "generate_report_route", skip(state, req))]
pub async fn generate_report_route(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> AppResult<Response> {
    let selection = req.into_selection()?;

    let artifact = state.session.generate_report(selection).await?;
    info!(
        kind = artifact.kind.label(),
        records = artifact.records.len(),
        "generate_report_route: done"
    );

    Ok(ApiResponse::success(ReportResponse::from(artifact.as_ref())).ok())
}

/// Handler: GET /reports/latest
#[instrument(name = "latest_report_route", skip(state))]
pub async fn latest_report_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let artifact = state.session.latest_report().await?;
    Ok(ApiResponse::success(ReportResponse::from(artifact.as_ref())).ok())
}

/// Handler: GET /reports/latest/pdf
#[instrument(name = "report_pdf_route", skip(state))]
pub async fn report_pdf_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let artifact = state.session.latest_report().await?;
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, PDF_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.pdf.clone(),
    )
        .into_response())
}

/// Handler: GET /reports/latest/data
#[instrument(name = "report_data_route", skip(state))]
pub async fn report_data_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let artifact = state.session.latest_report().await?;
    let body = ReportDataResponse {
        count: artifact.records.len(),
        records: &artifact.records,
    };
    Ok(ApiResponse::success(body).ok())
}
