// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorBody;

/// Failures talking to the hosted LLM API.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    #[error("request to LLM provider failed: {0}")]
    Upstream(String),

    #[error("LLM provider returned {status}")]
    Status { status: u16, body: String },

    #[error("LLM provider returned no content")]
    EmptyResponse,

    #[error("could not decode LLM provider response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Llm(LlmError::MissingApiKey { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Llm(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        (status, Json(ErrorBody { error: self.client_message() })).into_response()
    }
}
