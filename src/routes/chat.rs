use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::request::Parts,
};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse, Welcome},
    services::{chatbot::generate_reply, metrics_manager::MetricsData},
    state::SharedState,
};

pub const WELCOME_MESSAGE: &str = "Welcome to the Aidex AI Backend. We are ready to assist.";

pub async fn root_handler() -> Json<Welcome> {
    Json(Welcome { message: WELCOME_MESSAGE.to_string() })
}

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let trimmed = payload.message.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let session_id = match &payload.session_id {
        Some(s) if !s.trim().is_empty() => state.sessions.ensure_session(s.trim()).await,
        _ => state.sessions.create_session().await,
    };

    let language = payload
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("en");

    let reply = generate_reply(&state, &session_id, trimmed, language).await?;

    Ok(Json(ChatResponse { session_id, reply }))
}

pub async fn get_metrics_handler(_: AdminAuth, State(state): State<SharedState>) -> Json<MetricsData> {
    Json(state.metrics.get_metrics().await)
}

/// Requires `x-admin-key` to match the configured admin key.
pub struct AdminAuth;

impl FromRequestParts<SharedState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_api_key.as_deref() else {
            return Err(AppError::Unauthorized);
        };
        match parts.headers.get("x-admin-key") {
            Some(val) if val.as_bytes() == expected.as_bytes() => Ok(Self),
            _ => Err(AppError::Unauthorized),
        }
    }
}
