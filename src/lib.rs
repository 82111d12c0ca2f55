// Library re-exports for integration tests.
// The binary crate (main.rs) uses these modules directly via the lib crate.

pub mod cloner;
pub mod config;
pub mod confirm;
pub mod errors;
pub mod gateway;
pub mod ingest;
pub mod models;
pub mod platform;
pub mod progress;
pub mod remap;
pub mod rest;
pub mod stats;

use std::sync::Arc;

use config::AppConfig;
use confirm::PendingOps;
use models::EntityId;
use platform::PlatformApi;

// ─── Bot State ─────────────────────────────────────────

/// Shared state threaded through the message-ingestion path. Generic over
/// the platform client so tests can swap in an in-memory implementation.
pub struct BotState<A: PlatformApi> {
    pub api: Arc<A>,
    pub config: AppConfig,
    /// One slot per operator identity: pending confirmation or in-flight run.
    pub pending: PendingOps,
    /// The authenticated account's own ID (self-echoes are allowed through).
    pub self_id: EntityId,
}

impl<A: PlatformApi> Clone for BotState<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            config: self.config.clone(),
            pending: self.pending.clone(),
            self_id: self.self_id,
        }
    }
}

impl<A: PlatformApi> BotState<A> {
    pub fn new(api: Arc<A>, config: AppConfig, self_id: EntityId) -> Self {
        Self {
            api,
            config,
            pending: confirm::new_pending_ops(),
            self_id,
        }
    }
}
