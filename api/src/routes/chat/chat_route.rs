//! Chat panel: GET /chat (transcript) and POST /chat (one turn).

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::Response,
};
use tracing::{debug, instrument};

use crate::{
    core::{
        app_state::AppState,
        http::response_envelope::{ApiErrorDetail, ApiResponse},
    },
    error_handler::AppResult,
    routes::chat::chat_request::{ChatRequest, ChatResponse, TranscriptResponse},
};

/// Handler: GET /chat
#[instrument(name = "transcript_route", skip(state))]
pub async fn transcript_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let messages = state.session.transcript().await;
    Ok(ApiResponse::success(TranscriptResponse { messages }).ok())
}

/// Handler: POST /chat
///
/// A model or store failure is returned as an error envelope; the user turn
/// stays in the transcript and the session keeps working.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/chat \
///   -H 'content-type: application/json' \
///   -d '{"message":"What are the top origin countries?"}'
/// ```
#[instrument(name = "chat_route", skip(state, req))]
pub async fn chat_route(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> AppResult<Response> {
    let message = req.message.trim();

    if message.is_empty() {
        return Ok(ApiResponse::<()>::error(
            "BAD_REQUEST",
            "Message must not be empty.",
            vec![ApiErrorDetail::field(
                "message",
                "Ask about migration trends, e.g. \"What are the top origin countries?\"",
            )],
        )
        .into_response_with_status(StatusCode::BAD_REQUEST));
    }

    let reply = state.session.chat(message).await?;
    let turns = state.session.transcript().await.len();
    debug!(turns, reply_len = reply.len(), "chat_route: answered");

    Ok(ApiResponse::success(ChatResponse { reply, turns }).ok())
}
