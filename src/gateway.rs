use std::time::Duration;

use anyhow::{anyhow, Context};
use futures::{SinkExt, Stream, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::ingest;
use crate::models::InboundMessage;
use crate::platform::PlatformApi;
use crate::rest::RestClient;
use crate::BotState;

// Gateway opcodes we care about.
const OP_DISPATCH: u64 = 0;
const OP_HEARTBEAT: u64 = 1;
const OP_IDENTIFY: u64 = 2;
const OP_RECONNECT: u64 = 7;
const OP_INVALID_SESSION: u64 = 9;
const OP_HELLO: u64 = 10;

/// GUILDS | GUILD_MESSAGES | MESSAGE_CONTENT — enough to see trigger
/// commands and confirmation replies.
const INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 15);

/// Connect to the real-time gateway and feed MESSAGE_CREATE events into the
/// ingest layer, reconnecting with a fixed pause on any disconnect.
/// Runs until the process shuts down.
pub async fn run<A: PlatformApi + 'static>(state: BotState<A>, rest: &RestClient) {
    loop {
        let session = async {
            let url = rest.gateway_url().await.context("gateway URL lookup")?;
            connect_and_serve(&state, &url).await
        }
        .await;

        match session {
            Ok(()) => tracing::info!("gateway connection closed, reconnecting"),
            Err(e) => tracing::warn!(error = %e, "gateway session failed, reconnecting"),
        }
        tokio::time::sleep(state.config.gateway_reconnect()).await;
    }
}

/// One gateway session: HELLO → IDENTIFY → heartbeat + dispatch loop.
/// Returns Ok on an orderly close, Err on anything unexpected.
async fn connect_and_serve<A: PlatformApi + 'static>(
    state: &BotState<A>,
    url: &str,
) -> anyhow::Result<()> {
    let full_url = format!("{url}/?v=10&encoding=json");
    let (ws, _) = connect_async(&full_url).await.context("gateway connect")?;
    let (mut sink, mut stream) = ws.split();

    // First frame must be HELLO with the heartbeat interval.
    let hello = next_frame(&mut stream)
        .await?
        .ok_or_else(|| anyhow!("gateway closed before HELLO"))?;
    if hello["op"].as_u64() != Some(OP_HELLO) {
        return Err(anyhow!("expected HELLO, got op {}", hello["op"]));
    }
    let heartbeat_ms = hello["d"]["heartbeat_interval"]
        .as_u64()
        .ok_or_else(|| anyhow!("HELLO missing heartbeat_interval"))?;

    let identify = json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": state.config.token,
            "intents": INTENTS,
            "properties": { "os": "linux", "browser": "guild-mirror", "device": "guild-mirror" },
        }
    });
    sink.send(Message::Text(identify.to_string())).await?;

    let mut heartbeat = tokio::time::interval(Duration::from_millis(heartbeat_ms));
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // Consume the immediate first tick so the first heartbeat waits a full
    // interval after IDENTIFY.
    heartbeat.tick().await;

    let mut last_seq: Option<u64> = None;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let payload = json!({ "op": OP_HEARTBEAT, "d": last_seq });
                sink.send(Message::Text(payload.to_string())).await?;
            }
            frame = next_frame(&mut stream) => {
                let Some(frame) = frame? else {
                    return Ok(());
                };
                if let Some(s) = frame["s"].as_u64() {
                    last_seq = Some(s);
                }
                match frame["op"].as_u64() {
                    Some(OP_DISPATCH) => handle_dispatch(state, &frame).await,
                    Some(OP_HEARTBEAT) => {
                        let payload = json!({ "op": OP_HEARTBEAT, "d": last_seq });
                        sink.send(Message::Text(payload.to_string())).await?;
                    }
                    Some(OP_RECONNECT) | Some(OP_INVALID_SESSION) => {
                        return Err(anyhow!("gateway requested reconnect"));
                    }
                    // Heartbeat ACK and anything else: nothing to do.
                    _ => {}
                }
            }
        }
    }
}

async fn handle_dispatch<A: PlatformApi + 'static>(state: &BotState<A>, frame: &Value) {
    match frame["t"].as_str() {
        Some("READY") => {
            let tag = frame["d"]["user"]["username"].as_str().unwrap_or("?");
            tracing::info!(user = tag, "gateway ready, listening for commands");
        }
        Some("MESSAGE_CREATE") => {
            match serde_json::from_value::<InboundMessage>(frame["d"].clone()) {
                Ok(msg) => ingest::handle_message(state, &msg).await,
                Err(e) => tracing::debug!(error = %e, "unparseable MESSAGE_CREATE"),
            }
        }
        _ => {}
    }
}

/// Next text frame as JSON, skipping pings. `Ok(None)` means the peer
/// closed the connection.
async fn next_frame<S>(stream: &mut S) -> anyhow::Result<Option<Value>>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(message) = stream.next().await {
        match message? {
            Message::Text(text) => {
                return Ok(Some(serde_json::from_str(&text)?));
            }
            Message::Close(_) => return Ok(None),
            // Pongs are handled by tungstenite; ignore everything else.
            _ => {}
        }
    }
    Ok(None)
}
