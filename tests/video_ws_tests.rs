mod support;

use std::net::SocketAddr;
use std::time::Duration;

use aidex_backend::message::VideoReply;
use aidex_backend::routes::create_router;
use futures_util::{SinkExt, StreamExt};
use support::{ScriptedLlm, test_state};
use tokio_tungstenite::tungstenite::Message;

async fn start_server(llm: std::sync::Arc<ScriptedLlm>) -> SocketAddr {
    let app = create_router("public").with_state(test_state(llm));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

#[tokio::test]
async fn frames_are_analyzed_over_websocket() {
    let llm = ScriptedLlm::medical(true);
    let addr = start_server(llm.clone()).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/video"))
        .await
        .unwrap();

    // No image: ignored, then a real frame gets an answer
    ws.send(Message::Text(r#"{"prompt": "anything?"}"#.into())).await.unwrap();
    ws.send(Message::Text(r#"{"image": "/9j/AAAA", "prompt": "Is my eye red?"}"#.into()))
        .await
        .unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let reply: VideoReply = serde_json::from_str(msg.to_text().unwrap()).unwrap();
    assert_eq!(reply, VideoReply::Analysis { analysis: "The user appears calm.".into() });

    let calls = llm.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains("Is my eye red?"));

    ws.close(None).await.unwrap();
}

#[tokio::test]
async fn invalid_json_closes_with_internal_error() {
    let addr = start_server(ScriptedLlm::medical(true)).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/video"))
        .await
        .unwrap();

    ws.send(Message::Text("not json".into())).await.unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    match msg {
        Message::Close(Some(frame)) => assert_eq!(u16::from(frame.code), 1011),
        other => panic!("expected close frame, got {other:?}"),
    }
}
