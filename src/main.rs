use std::sync::Arc;

use guild_mirror::{config::AppConfig, gateway, rest::RestClient, BotState};

// ─── Main ──────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guild_mirror=debug".into()),
        )
        .init();

    let config = AppConfig::from_env();
    if config.allowed_operators.is_empty() {
        tracing::warn!("ALLOWED_OPERATOR_IDS is empty; every command will be ignored");
    }

    let rest = match RestClient::new(&config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };

    // Verify the token before touching the gateway.
    let me = match rest.current_user().await {
        Ok(me) => me,
        Err(e) => {
            tracing::error!(error = %e, "login failed; check MIRROR_TOKEN in the environment");
            std::process::exit(1);
        }
    };
    tracing::info!(user = %me.username, id = %me.id, "logged in");

    let state = BotState::new(rest.clone(), config, me.id);

    tokio::select! {
        _ = gateway::run(state, &rest) => {}
        _ = shutdown_signal() => {}
    }

    tracing::info!("guild-mirror shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
