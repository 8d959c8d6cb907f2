use anyhow::Context;
use std::sync::Arc;
use switchboard_server::http::AppState;
use switchboard_server::room::{RoomLifecycle, RoomRegistry};
use switchboard_server::{AnonymousIdentity, Config, RelayCredentialIssuer, build_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchboard_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(?config, "configuration loaded");

    let identity = Arc::new(
        AnonymousIdentity::new(&config.identity_secret, config.secure_cookies)
            .context("identity service")?,
    );
    let relay_credentials =
        Arc::new(RelayCredentialIssuer::new(&config.relay_secret).context("relay credentials")?);

    let registry = Arc::new(RoomRegistry::new());
    let lifecycle = Arc::new(RoomLifecycle::new(Arc::clone(&registry)));
    lifecycle.spawn_background_tasks();

    let app = build_router(AppState {
        registry,
        lifecycle,
        identity,
        relay_credentials,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
