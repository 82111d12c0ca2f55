use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::models::EntityId;

// ─── Pending Operation Store ───────────────────────────

/// Keyed slot per operator identity. One entry covers the whole lifecycle:
/// both confirmation steps and the in-flight run (`Running`). While the
/// entry exists, new trigger commands from that operator are suppressed.
pub type PendingOps = Arc<DashMap<EntityId, PendingOperation>>;

pub fn new_pending_ops() -> PendingOps {
    Arc::new(DashMap::new())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingStep {
    /// Awaiting the initial proceed/cancel answer.
    ConfirmProceed,
    /// Awaiting the emoji-inclusion answer.
    ConfirmEmojis,
    /// Replication is in flight; cleared by `finish_run`.
    Running,
}

#[derive(Debug, Clone)]
pub struct PendingOperation {
    pub step: PendingStep,
    pub source_id: EntityId,
    pub target_id: EntityId,
    /// Channel the trigger came from; replies elsewhere are ignored and all
    /// progress for the run is reported here.
    pub channel_id: EntityId,
}

// ─── State Machine ─────────────────────────────────────

/// What the caller should do after feeding a reply into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Not a well-formed reply, wrong channel, or nothing pending —
    /// the message is neither consumed nor an error.
    Ignored,
    /// Operator answered no at the first step; state deleted.
    Cancelled,
    /// Operator answered yes at the first step; ask about emojis.
    AwaitingEmojiChoice,
    /// Final step answered; start the run exactly once.
    Launch {
        source_id: EntityId,
        target_id: EntityId,
        include_emojis: bool,
        channel_id: EntityId,
    },
}

/// Insert-if-absent: create a pending confirmation for `operator`.
/// Returns `false` (and leaves the existing entry untouched) when a
/// confirmation or run is already in flight for that operator.
pub fn begin(
    pending: &PendingOps,
    operator: EntityId,
    source_id: EntityId,
    target_id: EntityId,
    channel_id: EntityId,
) -> bool {
    match pending.entry(operator) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(PendingOperation {
                step: PendingStep::ConfirmProceed,
                source_id,
                target_id,
                channel_id,
            });
            true
        }
    }
}

/// Feed a free-text reply into the operator's pending confirmation.
pub fn handle_reply(
    pending: &PendingOps,
    operator: EntityId,
    channel_id: EntityId,
    content: &str,
) -> ReplyOutcome {
    let outcome = {
        let Some(mut op) = pending.get_mut(&operator) else {
            return ReplyOutcome::Ignored;
        };
        if op.channel_id != channel_id {
            return ReplyOutcome::Ignored;
        }
        let Some(affirmative) = parse_reply(content) else {
            return ReplyOutcome::Ignored;
        };

        match op.step {
            PendingStep::Running => ReplyOutcome::Ignored,
            PendingStep::ConfirmProceed => {
                if affirmative {
                    op.step = PendingStep::ConfirmEmojis;
                    ReplyOutcome::AwaitingEmojiChoice
                } else {
                    ReplyOutcome::Cancelled
                }
            }
            PendingStep::ConfirmEmojis => {
                // The slot stays occupied as the in-flight gate until the
                // spawned run calls finish_run.
                op.step = PendingStep::Running;
                ReplyOutcome::Launch {
                    source_id: op.source_id,
                    target_id: op.target_id,
                    include_emojis: affirmative,
                    channel_id: op.channel_id,
                }
            }
        }
    };

    if outcome == ReplyOutcome::Cancelled {
        pending.remove(&operator);
    }
    outcome
}

/// Release the operator's slot once the spawned run has finished.
pub fn finish_run(pending: &PendingOps, operator: EntityId) {
    pending.remove(&operator);
}

/// `y`/`yes` → affirmative, `n`/`no` → negative, anything else → not a reply.
fn parse_reply(content: &str) -> Option<bool> {
    match content.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
