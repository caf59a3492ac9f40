// src/services/agents.rs
//
// Prompt templates for each step of the assistant pipeline.

use serde_json::Value;

use super::session_manager::Message;

pub const REFUSAL_MESSAGE: &str = "I am an AI medical assistant named Aidex. I can only answer questions related to medical symptoms, health conditions, and wellness. How can I help you with a medical topic?";

pub const DEFAULT_VISUAL_PROMPT: &str = "Analyze the user's visual state and emotion.";

const LANGUAGES: &[(&str, &str)] = &[
    ("es", "Spanish"),
    ("hi", "Hindi"),
    ("fr", "French"),
    ("de", "German"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ru", "Russian"),
    ("ar", "Arabic"),
    ("te", "Telugu"),
];

/// Resolve a language code (`es`, `es-MX`, `zh_CN`) to a language name.
/// Returns `None` for English and for codes we don't translate to.
pub fn target_language(code: &str) -> Option<&'static str> {
    find_language(code).map(|(_, name)| name)
}

/// Metrics key for a client language code: a supported code, `en`, or `other`.
pub fn language_bucket(code: &str) -> &'static str {
    if let Some((supported, _)) = find_language(code) {
        return supported;
    }
    match primary_subtag(code).as_str() {
        "" | "en" => "en",
        _ => "other",
    }
}

fn primary_subtag(code: &str) -> String {
    code.trim().split(['-', '_']).next().unwrap_or_default().to_ascii_lowercase()
}

fn find_language(code: &str) -> Option<(&'static str, &'static str)> {
    let primary = primary_subtag(code);
    LANGUAGES.iter().find(|(c, _)| *c == primary).copied()
}

/// Parse the guard model's `{"is_medical": ...}` answer.
///
/// Accepts a bool, the strings `"true"`/`"false"`, or a number; a missing
/// or null flag counts as non-medical.
pub fn parse_guard_verdict(raw: &str) -> Option<bool> {
    let body = strip_code_fence(raw.trim());
    let verdict: Value = serde_json::from_str(body).ok()?;
    match verdict.as_object()?.get("is_medical") {
        None | Some(Value::Null) => Some(false),
        Some(Value::Bool(flag)) => Some(*flag),
        Some(Value::String(flag)) => Some(flag.trim().eq_ignore_ascii_case("true")),
        Some(Value::Number(n)) => Some(n.as_f64().is_some_and(|n| n != 0.0)),
        Some(_) => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn medical_guard_prompt(user_query: &str) -> String {
    format!(
        r#"You classify messages for a medical assistant. Decide whether the user's message is about medicine, health, symptoms, or wellness.

User message: "{user_query}"

Answer with a JSON object with exactly one boolean key, "is_medical".
- true for medical, health, symptom, medication, or wellness questions.
- false for anything else (math, history, programming, small talk).

Examples:
- "I have a headache and a fever." -> {{"is_medical": true}}
- "What are the side effects of ibuprofen?" -> {{"is_medical": true}}
- "My stomach hurts." -> {{"is_medical": true}}
- "What is the capital of France?" -> {{"is_medical": false}}
- "Hello, how are you?" -> {{"is_medical": false}}"#
    )
}

pub fn symptom_analysis_prompt(user_query: &str, history: &[Message]) -> String {
    let history = history
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are Aidex, a warm, empathetic and conversational AI medical assistant.
You help people understand their symptoms by asking good follow-up questions.
You are NOT a doctor. Never give a diagnosis and never prescribe medication.

Persona:
- Conversational: natural, friendly language, never robotic.
- Empathetic: acknowledge how the user feels.
- Inquisitive: ask for details before drawing any conclusion.
- Safe: remind the user to consult a healthcare professional.

How to answer:
1. Acknowledge the symptom.
2. Ask at least two clarifying questions (onset, character of the pain, what helps or worsens it).
3. Keep the reply short and kind.
4. Finish every reply with a safety disclaimer.

Conversation so far:
{history}

Current user message: "{user_query}"

Write your reply to the current message."#
    )
}

pub fn translation_prompt(text: &str, language: &str) -> String {
    format!(
        r#"Translate the following text into {language}.
Reply with the translation only, with no commentary or explanation.

Text: "{text}""#
    )
}

pub fn visual_analysis_prompt(user_request: &str) -> String {
    format!(
        r#"You are an AI medical assistant looking at a frame from the user's webcam.

Guidelines:
- Be descriptive and objective about what is visible.
- For emotions, describe facial expressions (for example a smile or a furrowed brow).
- For physical signs such as a rash or swelling, describe how they look.
- Do not diagnose. State that a visual analysis is no substitute for an examination by a professional.
- End with a safety disclaimer.

User request: "{user_request}"

Analyze the attached image for this request."#
    )
}
