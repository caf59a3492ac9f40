mod support;

use aidex_backend::message::{ChatResponse, ErrorBody, Welcome};
use aidex_backend::routes::create_router;
use aidex_backend::services::agents::REFUSAL_MESSAGE;
use aidex_backend::services::metrics_manager::MetricsData;
use aidex_backend::state::AppState;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use support::{ScriptedLlm, Step, test_config};
use tower::util::ServiceExt;

fn app_with(llm: Arc<ScriptedLlm>) -> Router {
    let state = Arc::new(AppState::new(&test_config(), llm));
    create_router("public").with_state(state)
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = app_with(ScriptedLlm::medical(true));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let welcome: Welcome = read_json(response).await;
    assert!(welcome.message.contains("Aidex"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_with(ScriptedLlm::medical(true));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_chat_endpoint() {
    let app = app_with(ScriptedLlm::medical(true));

    let response = app
        .oneshot(chat_request(r#"{"message": "I have a fever", "session_id": null}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = read_json(response).await;
    assert!(!chat_resp.session_id.is_empty());
    assert!(chat_resp.reply.contains("doctor"));
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let llm = ScriptedLlm::medical(true);
    let app = app_with(llm.clone());

    let response = app
        .oneshot(chat_request(r#"{"message": "   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorBody = read_json(response).await;
    assert_eq!(error.error, "Message cannot be empty");
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn test_session_id_is_echoed_and_history_kept() {
    let llm = ScriptedLlm::medical(true);
    let state = Arc::new(AppState::new(&test_config(), llm.clone()));
    let app = create_router("public").with_state(state.clone());

    let response = app.clone().oneshot(chat_request(r#"{"message": "My ear hurts"}"#)).await.unwrap();
    let first: ChatResponse = read_json(response).await;

    let body = format!(r#"{{"message": "Since Monday", "session_id": "{}"}}"#, first.session_id);
    let response = app.oneshot(chat_request(&body)).await.unwrap();
    let second: ChatResponse = read_json(response).await;

    assert_eq!(second.session_id, first.session_id);
    let history = state.sessions.get_history(&first.session_id).await.unwrap();
    assert_eq!(history.len(), 4);
    assert!(llm.calls()[3].prompt.contains("user: My ear hurts"));
}

#[tokio::test]
async fn test_client_chosen_session_id() {
    let app = app_with(ScriptedLlm::medical(true));

    let response = app
        .oneshot(chat_request(r#"{"message": "I feel tired", "session_id": "tab-42"}"#))
        .await
        .unwrap();

    let chat_resp: ChatResponse = read_json(response).await;
    assert_eq!(chat_resp.session_id, "tab-42");
}

#[tokio::test]
async fn test_non_medical_refusal() {
    let llm = ScriptedLlm::medical(false);
    let app = app_with(llm.clone());

    let response = app
        .oneshot(chat_request(r#"{"message": "Who won the world cup?", "language": "en"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = read_json(response).await;
    assert_eq!(chat_resp.reply, REFUSAL_MESSAGE);
    assert_eq!(llm.steps(), [Step::Guard]);
}

#[tokio::test]
async fn test_translated_reply() {
    let app = app_with(ScriptedLlm::medical(true));

    let response = app
        .oneshot(chat_request(r#"{"message": "मुझे बुखार है", "language": "hi"}"#))
        .await
        .unwrap();

    let chat_resp: ChatResponse = read_json(response).await;
    assert_eq!(chat_resp.reply, "[Hindi] translated");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let llm = ScriptedLlm::new(|step, _| match step {
        Step::Guard => Ok(r#"{"is_medical": true}"#.into()),
        _ => Err(aidex_backend::error::LlmError::Status { status: 429, body: "quota".into() }),
    });
    let app = app_with(llm);

    let response = app
        .oneshot(chat_request(r#"{"message": "chest pain"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let error: ErrorBody = read_json(response).await;
    assert!(error.error.contains("429"));
}

#[tokio::test]
async fn test_missing_api_key_is_service_unavailable() {
    let llm = ScriptedLlm::new(|step, _| match step {
        Step::Guard => Ok(r#"{"is_medical": true}"#.into()),
        _ => Err(aidex_backend::error::LlmError::MissingApiKey { provider: "Gemini" }),
    });
    let app = app_with(llm);

    let response = app
        .oneshot(chat_request(r#"{"message": "chest pain"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = app_with(ScriptedLlm::medical(true));

    let response = app.oneshot(chat_request(r#"{"session_id": "x"}"#)).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_admin_metrics_requires_key() {
    let mut config = test_config();
    config.admin_api_key = Some("letmein".to_string());
    let state = Arc::new(AppState::new(&config, ScriptedLlm::medical(true)));
    let app = create_router("public").with_state(state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/admin/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/metrics")
                .header("x-admin-key", "wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    app.clone().oneshot(chat_request(r#"{"message": "sore throat", "language": "de"}"#)).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/metrics")
                .header("x-admin-key", "letmein")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let metrics: MetricsData = read_json(response).await;
    assert_eq!(metrics.language_usage.get("de"), Some(&1));
    assert_eq!(metrics.topic_usage.get("medical"), Some(&1));
}

#[tokio::test]
async fn test_admin_disabled_without_configured_key() {
    let app = app_with(ScriptedLlm::medical(true));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/metrics")
                .header("x-admin-key", "")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_static_frontend_is_served() {
    let dir = std::env::temp_dir().join(format!("aidex-static-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>Aidex</h1>").unwrap();

    let state = Arc::new(AppState::new(&test_config(), ScriptedLlm::medical(true)));
    let app = create_router(&dir).with_state(state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"<h1>Aidex</h1>");

    let response = app
        .oneshot(Request::builder().uri("/missing.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let app = app_with(ScriptedLlm::medical(true));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/chat")
                .header("origin", "https://aidex.example")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("access-control-allow-origin"));
}
