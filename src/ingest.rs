use crate::cloner::ServerCloner;
use crate::confirm::{self, ReplyOutcome};
use crate::models::{EntityId, InboundMessage};
use crate::platform::PlatformApi;
use crate::progress::{ProgressReporter, Severity};
use crate::BotState;

const TRIGGER: &str = "!clone";

/// Message front end: filters by operator allow-list, routes replies into
/// the confirmation machine, and recognizes the trigger command. The
/// replication run itself is spawned off this path — message handling never
/// blocks on a run.
pub async fn handle_message<A: PlatformApi + 'static>(state: &BotState<A>, msg: &InboundMessage) {
    // Other bots never drive the machine; our own echoes may (self-bot style).
    if msg.author.bot && msg.author.id != state.self_id {
        return;
    }
    if !state.config.allowed_operators.contains(&msg.author.id) {
        return;
    }

    // An occupied slot means a confirmation or run is in flight: the message
    // is a potential reply, and new triggers are suppressed.
    if state.pending.contains_key(&msg.author.id) {
        handle_pending_reply(state, msg).await;
        return;
    }

    if let Some(args) = msg.content.strip_prefix(TRIGGER) {
        handle_trigger(state, msg, args).await;
    }
}

async fn handle_trigger<A: PlatformApi + 'static>(
    state: &BotState<A>,
    msg: &InboundMessage,
    args: &str,
) {
    let reporter = ProgressReporter::new(state.api.clone(), msg.channel_id);

    let mut parts = args.split_whitespace();
    let ids = (
        parts.next().and_then(|s| s.parse::<EntityId>().ok()),
        parts.next().and_then(|s| s.parse::<EntityId>().ok()),
    );
    let (Some(source_id), Some(target_id)) = ids else {
        reporter
            .emit(
                "❌ Usage: `!clone <source community ID> <target community ID>`",
                Severity::Error,
            )
            .await;
        return;
    };

    // Both communities must resolve before any state is created.
    let source = match state.api.fetch_community(source_id).await {
        Ok(c) => c,
        Err(_) => {
            reporter
                .emit("❌ Source community not found!", Severity::Error)
                .await;
            return;
        }
    };
    let target = match state.api.fetch_community(target_id).await {
        Ok(c) => c,
        Err(_) => {
            reporter
                .emit("❌ Target community not found!", Severity::Error)
                .await;
            return;
        }
    };

    if !confirm::begin(
        &state.pending,
        msg.author.id,
        source_id,
        target_id,
        msg.channel_id,
    ) {
        return;
    }

    reporter
        .emit(
            &format!(
                "📋 **Replication Confirmation**\n- Source: **{}**\n- Target: **{}**\n\n\
                 Do you want to proceed? (type `y` or `n`)",
                source.name, target.name
            ),
            Severity::Plain,
        )
        .await;
}

async fn handle_pending_reply<A: PlatformApi + 'static>(state: &BotState<A>, msg: &InboundMessage) {
    let outcome = confirm::handle_reply(
        &state.pending,
        msg.author.id,
        msg.channel_id,
        &msg.content,
    );
    let reporter = ProgressReporter::new(state.api.clone(), msg.channel_id);

    match outcome {
        ReplyOutcome::Ignored => {}
        ReplyOutcome::Cancelled => {
            reporter.emit("❌ Operation cancelled.", Severity::Info).await;
        }
        ReplyOutcome::AwaitingEmojiChoice => {
            reporter
                .emit(
                    "❓ Do you want to replicate emojis as well? (type `y` or `n`)",
                    Severity::Plain,
                )
                .await;
        }
        ReplyOutcome::Launch {
            source_id,
            target_id,
            include_emojis,
            channel_id,
        } => {
            let suffix = if include_emojis { " (including emojis)" } else { "" };
            reporter
                .emit(
                    &format!("🚀 Starting community replication...{suffix}"),
                    Severity::Info,
                )
                .await;

            let api = state.api.clone();
            let config = state.config.clone();
            let pending = state.pending.clone();
            let operator = msg.author.id;
            tokio::spawn(async move {
                let cloner = ServerCloner::new(api, config);
                cloner
                    .clone_server(source_id, target_id, include_emojis, channel_id)
                    .await;
                confirm::finish_run(&pending, operator);
            });
        }
    }
}
