use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cookie_session::{CookieConfig, CookieStore, KeyPair, keys_from_env};

mod handlers;

use crate::handlers::{AppState, index, login, logout};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,cookie_session=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut keys = keys_from_env()?;
    if keys.is_empty() {
        tracing::warn!(
            "SESSION_KEYS not set, using ephemeral keys; sessions will not survive a restart"
        );
        keys.push(KeyPair::generate(true)?);
    }

    let config = CookieConfig::from_env();
    if config.secure {
        tracing::warn!(
            "Session cookies are Secure but the demo serves plain HTTP; browsers only keep them on localhost (see .env.example)"
        );
    }
    tracing::info!(
        path = %config.path,
        max_age = config.max_age,
        secure = config.secure,
        keys = keys.len(),
        "Session cookie policy"
    );
    let store: AppState = Arc::new(CookieStore::new(Some(config), &keys)?);

    let app = Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/logout", get(logout))
        .with_state(store);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
