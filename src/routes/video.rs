use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::Response,
};

use crate::{message::VideoFrame, services::chatbot::analyze_frame, state::SharedState};

pub async fn video_ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> Response {
    ws.on_upgrade(move |socket| handle_video_socket(socket, state))
}

async fn handle_video_socket(mut socket: WebSocket, state: SharedState) {
    tracing::info!("video client connected");

    while let Some(msg) = socket.recv().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "video socket receive failed");
                break;
            }
        };

        let frame: VideoFrame = match serde_json::from_str(text.as_str()) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "invalid video frame, closing socket");
                let close = CloseFrame {
                    code: close_code::ERROR,
                    reason: Utf8Bytes::from_static("invalid JSON frame"),
                };
                let _ = socket.send(Message::Close(Some(close))).await;
                break;
            }
        };

        let Some(reply) = analyze_frame(&state, frame).await else {
            continue;
        };

        let payload = match serde_json::to_string(&reply) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "could not encode video reply");
                break;
            }
        };
        if socket.send(Message::Text(payload.into())).await.is_err() {
            break;
        }
    }

    tracing::info!("video client disconnected");
}
