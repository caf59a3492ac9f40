// src/services/chatbot.rs
use crate::error::LlmError;
use crate::message::{VideoFrame, VideoReply};
use crate::state::AppState;

use super::agents::{
    self, DEFAULT_VISUAL_PROMPT, REFUSAL_MESSAGE, medical_guard_prompt, parse_guard_verdict,
    symptom_analysis_prompt, translation_prompt, visual_analysis_prompt,
};
use super::llm::{GenerateRequest, InlineImage, ModelTier};
use super::metrics_manager::Topic;

pub const GUARD_FAILURE_REPLY: &str =
    "I'm sorry, I'm having trouble understanding the nature of your request right now.";

/// Run one chat turn: classify, answer, remember, translate.
///
/// Only a failed symptom analysis is returned as an error; guard and
/// translation failures degrade to a canned or untranslated reply.
pub async fn generate_reply(
    state: &AppState,
    session_id: &str,
    message: &str,
    language: &str,
) -> Result<String, LlmError> {
    state.metrics.increment_language(agents::language_bucket(language)).await;

    let topic = classify(state, message).await;
    state.metrics.increment_topic(topic).await;

    match topic {
        Topic::Unclassified => return Ok(GUARD_FAILURE_REPLY.to_string()),
        Topic::NonMedical => {
            tracing::info!(session_id, "declined non-medical query");
            return Ok(translate_or_keep(state, REFUSAL_MESSAGE, language).await);
        }
        Topic::Medical => {}
    }

    let history = state.sessions.get_history(session_id).await.unwrap_or_default();
    let prompt = symptom_analysis_prompt(message, &history);
    let reply = state
        .llm
        .generate(&GenerateRequest::text(ModelTier::Pro, prompt))
        .await?;

    let stored = state.sessions.append_exchange(session_id, message, &reply).await;
    tracing::debug!(session_id, history_len = stored, "recorded exchange");

    Ok(translate_or_keep(state, &reply, language).await)
}

async fn classify(state: &AppState, message: &str) -> Topic {
    let request = GenerateRequest::json(ModelTier::Fast, medical_guard_prompt(message));
    let raw = match state.llm.generate(&request).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "guard call failed");
            return Topic::Unclassified;
        }
    };

    match parse_guard_verdict(&raw) {
        Some(true) => Topic::Medical,
        Some(false) => Topic::NonMedical,
        None => {
            tracing::warn!(response = %raw, "could not decode guard response");
            Topic::Unclassified
        }
    }
}

/// Translate `text` into the language behind `code`, or return it unchanged
/// when no translation is needed or the translation call fails.
pub async fn translate_or_keep(state: &AppState, text: &str, code: &str) -> String {
    let Some(language) = agents::target_language(code) else {
        return text.to_string();
    };

    let request = GenerateRequest::text(ModelTier::Fast, translation_prompt(text, language));
    match state.llm.generate(&request).await {
        Ok(translated) if !translated.trim().is_empty() => translated.trim().to_string(),
        Ok(_) => text.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, language, "translation failed, replying untranslated");
            text.to_string()
        }
    }
}

/// Analyze one webcam frame. Frames without an image get no reply.
pub async fn analyze_frame(state: &AppState, frame: VideoFrame) -> Option<VideoReply> {
    let image = frame.image.filter(|i| !i.trim().is_empty())?;
    let user_request = frame
        .prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_VISUAL_PROMPT.to_string());

    let request = GenerateRequest::text(ModelTier::Pro, visual_analysis_prompt(&user_request))
        .with_image(InlineImage::from_client(&image));

    state.metrics.increment_visual().await;
    Some(match state.llm.generate(&request).await {
        Ok(analysis) => VideoReply::Analysis { analysis },
        Err(e) => {
            tracing::warn!(error = %e, "visual analysis failed");
            VideoReply::Error { error: e.to_string() }
        }
    })
}
