use std::env;
use std::time::Duration;

use crate::models::EntityId;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Platform auth token, sent verbatim in the Authorization header.
    /// Bot accounts need the `Bot ` prefix included.
    pub token: String,

    /// REST API base, e.g. `https://discord.com/api/v10`.
    pub api_base: String,

    /// Operators allowed to issue the replication trigger command.
    pub allowed_operators: Vec<EntityId>,

    // Pacing between remote operations. These are explicit awaited pauses,
    // not rate-limit backoff: one remote call at a time, fixed spacing.
    pub delete_pause_ms: u64,
    pub create_pause_ms: u64,
    /// Emoji creation is the most expensive remote operation, so it gets a
    /// much longer pause than the other entity types.
    pub emoji_pause_ms: u64,

    pub gateway_reconnect_secs: u64,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            token: env::var("MIRROR_TOKEN").expect("MIRROR_TOKEN must be set"),

            api_base: env::var("MIRROR_API_BASE")
                .unwrap_or_else(|_| "https://discord.com/api/v10".into()),

            allowed_operators: env::var("ALLOWED_OPERATOR_IDS")
                .unwrap_or_default()
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect(),

            delete_pause_ms: env::var("DELETE_PAUSE_MS")
                .unwrap_or_else(|_| "100".into())
                .parse()
                .unwrap_or(100),
            create_pause_ms: env::var("CREATE_PAUSE_MS")
                .unwrap_or_else(|_| "200".into())
                .parse()
                .unwrap_or(200),
            emoji_pause_ms: env::var("EMOJI_PAUSE_MS")
                .unwrap_or_else(|_| "2000".into())
                .parse()
                .unwrap_or(2000),

            gateway_reconnect_secs: env::var("GATEWAY_RECONNECT_SECS")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .unwrap_or(5),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
        }
    }

    pub fn delete_pause(&self) -> Duration {
        Duration::from_millis(self.delete_pause_ms)
    }

    pub fn create_pause(&self) -> Duration {
        Duration::from_millis(self.create_pause_ms)
    }

    pub fn emoji_pause(&self) -> Duration {
        Duration::from_millis(self.emoji_pause_ms)
    }

    pub fn gateway_reconnect(&self) -> Duration {
        Duration::from_secs(self.gateway_reconnect_secs)
    }
}
