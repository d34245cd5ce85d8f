use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use rental_api::config::AppConfig;
use rental_api::state::AppState;
use rental_api::store::RestStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up the store URL and admin creds.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rental_api=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env().context("loading configuration")?;
    let state = AppState::new(Arc::new(RestStore::new(&config.store)), config);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("rental-api listening on http://{bind_addr}");
    axum::serve(listener, rental_api::app(state)).await.context("server")?;

    Ok(())
}
