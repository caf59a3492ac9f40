//! Google Gemini `generateContent` provider

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::llm::{GenerateRequest, LlmProvider, ModelSet};
use crate::error::LlmError;

/// Default Google Generative Language API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// -- Wire types --

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: GeminiContent,
}

impl From<&GenerateRequest> for GeminiRequest {
    fn from(request: &GenerateRequest) -> Self {
        let mut parts = vec![GeminiPart { text: Some(request.prompt.clone()), inline_data: None }];
        if let Some(image) = &request.image {
            parts.push(GeminiPart {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                }),
            });
        }

        Self {
            contents: vec![GeminiContent { role: None, parts }],
            generation_config: request.json_output.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        }
    }
}

impl GeminiResponse {
    /// Text of the first part of the first candidate, if it is not blank
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.trim().is_empty())
    }
}

// -- Provider --

pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    models: ModelSet,
}

impl GeminiProvider {
    pub fn new(client: Client, base_url: Option<String>, api_key: Option<String>, models: ModelSet) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self { client, base_url, api_key, models }
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey { provider: "Gemini" })?;
        let model = self.models.resolve(request.tier);
        let wire_request = GeminiRequest::from(request);

        let response = self
            .client
            .post(self.generate_url(model))
            .query(&[("key", api_key)])
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key
                let e = e.without_url();
                tracing::error!(provider = "gemini", model, error = %e, "upstream request failed");
                LlmError::Upstream(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = "gemini", model, status = %status, body = %body, "upstream returned error");
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let wire_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.without_url().to_string()))?;

        wire_response.first_text().ok_or_else(|| {
            tracing::warn!(provider = "gemini", model, "response carried no candidate text");
            LlmError::EmptyResponse
        })
    }
}
