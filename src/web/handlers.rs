use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::AppState;
use crate::chat::{ChatPayload, ChatResult};

/// Reply sent when the language model cannot be reached
pub const UNAVAILABLE_REPLY: &str =
    "Sorry, the assistant is unavailable right now. Please try again in a moment.";

/// Handler for the index page
pub async fn index_handler() -> impl IntoResponse {
    Html(include_str!("../../assets/index.html"))
}

/// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Handler for chat messages
pub async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let payload = ChatPayload::from_slice(&body);

    match state.chat.handle(&payload).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!("Failed to answer chat message: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ChatResult::new(UNAVAILABLE_REPLY)),
            )
                .into_response()
        }
    }
}
