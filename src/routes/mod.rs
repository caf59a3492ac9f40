// src/routes/mod.rs
pub mod chat;
pub mod video;

use std::path::Path;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{get, post},
};
use chat::{chat_handler, get_metrics_handler, root_handler};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use video::video_ws_handler;

pub fn create_router(static_dir: impl AsRef<Path>) -> Router<SharedState> {
    let admin_routes = Router::new().route("/metrics", get(get_metrics_handler));

    Router::new()
        .route("/", get(root_handler))
        .route("/chat", post(chat_handler))
        .route("/ws/video", get(video_ws_handler))
        .route("/health", get(|| async { "OK" }))
        .nest("/admin", admin_routes)
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}
