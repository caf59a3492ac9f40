//! Provider abstraction over the hosted LLM APIs

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{LlmConfig, ProviderKind};
use crate::error::LlmError;
use crate::services::{gemini::GeminiProvider, openai::OpenAiProvider};

/// Which configured model a call should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Cheap model for classification and translation
    Fast,
    /// Stronger model for symptom analysis and vision
    Pro,
}

/// Model names a provider resolves tiers to
#[derive(Debug, Clone)]
pub struct ModelSet {
    pub fast: String,
    pub pro: String,
}

impl ModelSet {
    pub fn resolve(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Pro => &self.pro,
        }
    }
}

/// Base64 image attached to a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Accepts raw base64 (assumed JPEG) or a `data:<mime>;base64,<data>` URL.
    pub fn from_client(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("data:")
            && let Some((meta, data)) = rest.split_once(',')
        {
            let mime_type = meta.strip_suffix(";base64").unwrap_or(meta);
            let mime_type = if mime_type.is_empty() { "image/jpeg" } else { mime_type };
            return Self { mime_type: mime_type.to_string(), data: data.to_string() };
        }
        Self { mime_type: "image/jpeg".to_string(), data: raw.to_string() }
    }
}

/// A single-turn generation request
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub tier: ModelTier,
    pub prompt: String,
    /// Ask the provider for a JSON-only reply
    pub json_output: bool,
    pub image: Option<InlineImage>,
}

impl GenerateRequest {
    pub fn text(tier: ModelTier, prompt: impl Into<String>) -> Self {
        Self { tier, prompt: prompt.into(), json_output: false, image: None }
    }

    pub fn json(tier: ModelTier, prompt: impl Into<String>) -> Self {
        Self { json_output: true, ..Self::text(tier, prompt) }
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Trait implemented by each hosted LLM backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Send the prompt and return the first candidate's text
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError>;
}

/// Build the provider selected in configuration
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| LlmError::Upstream(e.to_string()))?;
    let models = ModelSet { fast: config.fast_model.clone(), pro: config.pro_model.clone() };

    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            client,
            config.base_url.clone(),
            config.api_key.clone(),
            models,
        )),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
            client,
            config.base_url.clone(),
            config.api_key.clone(),
            models,
        )),
    };

    tracing::info!(provider = provider.name(), fast = %config.fast_model, pro = %config.pro_model, "LLM provider ready");
    Ok(provider)
}
