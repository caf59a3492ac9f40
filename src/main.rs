use std::sync::Arc;

use aidex_backend::{config::Config, routes, services::llm::build_provider, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = Config::from_env()?;
    if config.llm.api_key.is_none() {
        tracing::warn!(provider = ?config.llm.provider, "no API key configured, chat requests will fail");
    }

    let llm = build_provider(&config.llm)?;
    let state = Arc::new(AppState::new(&config, llm));
    state.sessions.spawn_sweeper(config.sweep_interval);

    let app = routes::create_router(&config.static_dir).with_state(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Aidex backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
