//! Change feed over the service's realtime websocket.
//!
//! One channel per table, joined with a `postgres_changes` filter for every event.
//! Frames are handed to the callback as they arrive; consumers re-list rather than
//! patching state from the payload.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{RemoteConfig, RemoteError};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Kind of row change reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A single change notification, payload passed through as received.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub payload: Value,
}

pub type ChangeCallback = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

/// Handle for a live feed. Offline mode hands out an inert handle.
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn noop() -> Self {
        Self { task: None }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    pub fn unsubscribe(self) {
        if let Some(task) = self.task {
            task.abort();
        }
    }
}

/// Phoenix channel frame.
#[derive(Debug, Serialize, Deserialize)]
struct Frame {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(rename = "ref", default)]
    reference: Option<String>,
}

/// Open a feed for `table`, delivering each change to `callback` until unsubscribed.
pub fn subscribe(
    config: &RemoteConfig,
    table: &'static str,
    callback: ChangeCallback,
) -> Result<Subscription, RemoteError> {
    let endpoint = websocket_url(config)?;
    let task = tokio::spawn(async move {
        loop {
            match listen(&endpoint, table, &callback).await {
                Ok(()) => tracing::debug!("Change feed for {} closed, reconnecting", table),
                Err(e) => tracing::warn!("Change feed for {} failed: {}", table, e),
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    });

    Ok(Subscription { task: Some(task) })
}

fn websocket_url(config: &RemoteConfig) -> Result<Url, RemoteError> {
    let base = format!("{}/realtime/v1/websocket", config.url.trim_end_matches('/'));
    let mut url = Url::parse(&base).map_err(|e| RemoteError::Transport(e.to_string()))?;

    let scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => other,
    }
    .to_string();
    url.set_scheme(&scheme)
        .map_err(|_| RemoteError::Transport(format!("Unsupported scheme {}", scheme)))?;

    url.query_pairs_mut()
        .append_pair("apikey", &config.key)
        .append_pair("vsn", "1.0.0");
    Ok(url)
}

fn topic_for(table: &str) -> String {
    format!("realtime:{}_changes", table)
}

async fn listen(endpoint: &Url, table: &str, callback: &ChangeCallback) -> Result<(), RemoteError> {
    let (socket, _) = connect_async(endpoint.as_str()).await?;
    let (mut sink, mut stream) = socket.split();

    let topic = topic_for(table);
    let join = Frame {
        topic: topic.clone(),
        event: "phx_join".to_string(),
        payload: json!({
            "config": {
                "postgres_changes": [
                    { "event": "*", "schema": "public", "table": table }
                ]
            }
        }),
        reference: Some("1".to_string()),
    };
    sink.send(Message::Text(serde_json::to_string(&join)?.into()))
        .await?;
    tracing::info!("Joined change feed {}", topic);

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;
    let mut next_ref: u64 = 2;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let beat = Frame {
                    topic: "phoenix".to_string(),
                    event: "heartbeat".to_string(),
                    payload: json!({}),
                    reference: Some(next_ref.to_string()),
                };
                next_ref += 1;
                sink.send(Message::Text(serde_json::to_string(&beat)?.into())).await?;
            }
            frame = stream.next() => match frame {
                None | Some(Ok(Message::Close(_))) => return Ok(()),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Text(text))) => {
                    if let Some(event) = decode_change(table, &topic, text.as_str()) {
                        callback(event);
                    }
                }
                Some(Ok(_)) => {}
            }
        }
    }
}

/// Extract a change event from a frame, ignoring replies and other topics.
fn decode_change(table: &str, topic: &str, text: &str) -> Option<ChangeEvent> {
    let frame: Frame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Unreadable change feed frame: {}", e);
            return None;
        }
    };
    if frame.topic != topic || frame.event != "postgres_changes" {
        return None;
    }

    let data = frame.payload.get("data").cloned().unwrap_or(frame.payload);
    let kind = serde_json::from_value(data.get("type")?.clone()).ok()?;
    Some(ChangeEvent {
        table: table.to_string(),
        kind,
        payload: data,
    })
}
