use serde::{Deserialize, Serialize};

use crate::core::session::ChatTurn;

/// Request payload for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Free-text question about migration trends.
    pub message: String,
}

/// Reply to one chat turn.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Transcript length after this turn.
    pub turns: usize,
}

/// Full transcript for GET /chat.
#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<ChatTurn>,
}
