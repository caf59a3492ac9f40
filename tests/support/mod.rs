//! Shared helpers for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use aidex_backend::config::Config;
use aidex_backend::error::LlmError;
use aidex_backend::services::llm::{GenerateRequest, LlmProvider, ModelTier};
use aidex_backend::state::AppState;
use async_trait::async_trait;

/// Which pipeline step a prompt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Guard,
    Translate,
    Analyze,
    Vision,
}

pub fn step_of(request: &GenerateRequest) -> Step {
    if request.image.is_some() {
        Step::Vision
    } else if request.json_output {
        Step::Guard
    } else if request.prompt.starts_with("Translate") {
        Step::Translate
    } else {
        Step::Analyze
    }
}

type Script = dyn Fn(Step, &GenerateRequest) -> Result<String, LlmError> + Send + Sync;

/// In-process provider answering from a closure and recording every call.
pub struct ScriptedLlm {
    script: Box<Script>,
    calls: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedLlm {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(Step, &GenerateRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Arc::new(Self { script: Box::new(script), calls: Mutex::new(Vec::new()) })
    }

    /// Guard says `is_medical`, analysis echoes a fixed reply, translation
    /// prefixes the language name.
    pub fn medical(is_medical: bool) -> Arc<Self> {
        Self::new(move |step, request| match step {
            Step::Guard => Ok(format!("{{\"is_medical\": {is_medical}}}")),
            Step::Analyze => Ok("How long have you had it? Please see a doctor.".to_string()),
            Step::Translate => {
                let language = request
                    .prompt
                    .split_whitespace()
                    .nth(5)
                    .unwrap_or_default()
                    .trim_end_matches('.');
                Ok(format!("[{language}] translated"))
            }
            Step::Vision => Ok("The user appears calm.".to_string()),
        })
    }

    pub fn calls(&self) -> Vec<GenerateRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn steps(&self) -> Vec<Step> {
        self.calls().iter().map(step_of).collect()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(request.clone());
        (self.script)(step_of(request), request)
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

pub fn test_state(llm: Arc<ScriptedLlm>) -> Arc<AppState> {
    Arc::new(AppState::new(&test_config(), llm))
}

pub fn pro_calls(llm: &ScriptedLlm) -> usize {
    llm.calls().iter().filter(|c| c.tier == ModelTier::Pro).count()
}
