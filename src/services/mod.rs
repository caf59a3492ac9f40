pub mod agents;
pub mod chatbot;
pub mod gemini;
pub mod llm;
pub mod metrics_manager;
pub mod openai;
pub mod session_manager;
