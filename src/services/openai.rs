//! OpenAI chat-completions provider

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::llm::{GenerateRequest, LlmProvider, ModelSet};
use crate::error::LlmError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// -- Wire types --

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn build(model: &'a str, request: &GenerateRequest) -> Self {
        let content = match &request.image {
            None => MessageContent::Text(request.prompt.clone()),
            Some(image) => MessageContent::Parts(vec![
                ContentPart::Text { text: request.prompt.clone() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: format!("data:{};base64,{}", image.mime_type, image.data) },
                },
            ]),
        };

        Self {
            model,
            messages: vec![ChatMessage { role: "user", content }],
            response_format: request.json_output.then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

// -- Provider --

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    models: ModelSet,
}

impl OpenAiProvider {
    pub fn new(client: Client, base_url: Option<String>, api_key: Option<String>, models: ModelSet) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self { client, base_url, api_key, models }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey { provider: "OpenAI" })?;
        let model = self.models.resolve(request.tier);
        let wire_request = ChatCompletionRequest::build(model, request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = "openai", model, error = %e, "upstream request failed");
                LlmError::Upstream(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = "openai", model, status = %status, body = %body, "upstream returned error");
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let wire_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        wire_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}
