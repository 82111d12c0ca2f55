use std::sync::Arc;

use crate::models::EntityId;
use crate::platform::PlatformApi;

/// Local log level for a progress line. Passed explicitly by the caller —
/// severity is never inferred from message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
    Plain,
}

/// Dual-sink progress emission: best-effort send to the reporting channel
/// plus a local tracing event. Purely observational — a failed channel send
/// is logged at `warn` and never affects the replication outcome.
pub struct ProgressReporter<A: ?Sized> {
    api: Arc<A>,
    channel: EntityId,
}

impl<A: PlatformApi + ?Sized> ProgressReporter<A> {
    pub fn new(api: Arc<A>, channel: EntityId) -> Self {
        Self { api, channel }
    }

    pub async fn emit(&self, text: &str, severity: Severity) {
        if let Err(e) = self.api.send_message(self.channel, text).await {
            tracing::warn!(
                channel = %self.channel,
                error = %e,
                "failed to send progress message to reporting channel"
            );
        }

        match severity {
            Severity::Error => tracing::error!("{text}"),
            Severity::Success => tracing::info!(outcome = "success", "{text}"),
            Severity::Info => tracing::info!("{text}"),
            Severity::Plain => tracing::debug!("{text}"),
        }
    }
}
