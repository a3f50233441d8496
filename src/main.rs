use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use campus_feedback_api::app::app;
use campus_feedback_api::auth::Authenticator;
use campus_feedback_api::config;
use campus_feedback_api::state::AppState;
use campus_feedback_api::store::StoreClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up STORE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!(
        "Starting Campus Feedback API in {:?} mode",
        config.environment
    );

    let store = StoreClient::new(
        &config.store.base_url,
        config.store.service_key.clone(),
        Duration::from_secs(config.store.request_timeout_secs),
    )
    .context("failed to build store client")?;
    let store = Arc::new(store);

    let authenticator = Arc::new(Authenticator::new(
        config.security.jwt_secret.clone(),
        store.clone(),
    ));

    let app = app(AppState::new(store, authenticator));

    // Allow tests or deployments to override port via env
    let port = std::env::var("CAMPUS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Campus Feedback API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
