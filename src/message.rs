// src/message.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
    /// BCP 47 style code from the browser, e.g. `en-US` or `es`.
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Welcome {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A webcam frame pushed over `/ws/video`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VideoFrame {
    /// Base64 JPEG, optionally as a `data:` URL.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum VideoReply {
    Analysis { analysis: String },
    Error { error: String },
}
