//! In-process stand-in for the hosted database service, used by tests.
//!
//! Serves the REST table endpoints, object storage and the realtime websocket
//! from in-memory state. `set_failing(true)` makes every HTTP call answer 503,
//! `set_stalled(true)` makes every HTTP call hang without answering.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::remote::RemoteConfig;

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    objects: HashMap<String, Vec<u8>>,
    next_id: i64,
    failing: bool,
    stalled: bool,
    joins: usize,
}

#[derive(Clone)]
struct MockState {
    inner: Arc<Mutex<Inner>>,
    changes: broadcast::Sender<(String, Value)>,
}

impl MockState {
    fn publish(&self, table: &str, kind: &str, record: Value) {
        let data = json!({
            "schema": "public",
            "table": table,
            "type": kind,
            "commit_timestamp": Utc::now().to_rfc3339(),
            "record": record,
        });
        let _ = self.changes.send((table.to_string(), data));
    }

    /// Early response for a failing service. Never resolves while stalled.
    async fn gate(&self) -> Option<Response> {
        let (failing, stalled) = {
            let inner = self.inner.lock().unwrap();
            (inner.failing, inner.stalled)
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        failing.then(unavailable)
    }
}

/// Running mock service bound to an ephemeral port.
pub struct MockRemote {
    pub url: String,
    state: MockState,
}

impl MockRemote {
    pub async fn start() -> Self {
        let (changes, _) = broadcast::channel(64);
        let state = MockState {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 1000,
                ..Default::default()
            })),
            changes,
        };

        let app = Router::new()
            .route(
                "/rest/v1/{table}",
                get(list_rows)
                    .post(insert_row)
                    .patch(update_row)
                    .delete(delete_row),
            )
            .route("/storage/v1/object/{bucket}/{name}", post(upload_object))
            .route("/realtime/v1/websocket", get(realtime))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock remote");
        let addr = listener.local_addr().expect("Failed to get addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self) -> RemoteConfig {
        RemoteConfig {
            url: self.url.clone(),
            key: "test-anon-key".to_string(),
            image_bucket: "menu-images".to_string(),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.inner.lock().unwrap().failing = failing;
    }

    pub fn set_stalled(&self, stalled: bool) {
        self.state.inner.lock().unwrap().stalled = stalled;
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .inner
            .lock()
            .unwrap()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Insert a row directly, as another client of the service would.
    pub fn insert_row(&self, table: &str, row: Value) -> Value {
        let stored = {
            let mut inner = self.state.inner.lock().unwrap();
            store_row(&mut inner, table, row)
        };
        self.state.publish(table, "INSERT", stored.clone());
        stored
    }

    pub fn object(&self, name: &str) -> Option<Vec<u8>> {
        self.state.inner.lock().unwrap().objects.get(name).cloned()
    }

    /// Wait until a realtime client has joined a channel.
    pub async fn wait_for_join(&self) {
        for _ in 0..100 {
            if self.state.inner.lock().unwrap().joins > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("No realtime client joined");
    }
}

fn store_row(inner: &mut Inner, table: &str, row: Value) -> Value {
    let mut row = match row {
        Value::Object(map) => map,
        other => panic!("Row must be an object, got {}", other),
    };
    inner.next_id += 1;
    row.entry("id").or_insert(json!(inner.next_id));
    row.entry("created_at")
        .or_insert(json!(Utc::now().to_rfc3339()));
    let stored = Value::Object(row);
    inner
        .tables
        .entry(table.to_string())
        .or_default()
        .push(stored.clone());
    stored
}

fn unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "message": "service unavailable" })),
    )
        .into_response()
}

fn id_filter(query: &HashMap<String, String>) -> Option<i64> {
    query.get("id")?.strip_prefix("eq.")?.parse().ok()
}

async fn list_rows(
    State(state): State<MockState>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = state.gate().await {
        return response;
    }
    let mut rows = state
        .inner
        .lock()
        .unwrap()
        .tables
        .get(&table)
        .cloned()
        .unwrap_or_default();

    rows.sort_by(|a, b| {
        a["created_at"]
            .as_str()
            .unwrap_or_default()
            .cmp(b["created_at"].as_str().unwrap_or_default())
    });
    if query.get("order").map(String::as_str) == Some("created_at.desc") {
        rows.reverse();
    }
    if let Some(limit) = query.get("limit").and_then(|l| l.parse().ok()) {
        rows.truncate(limit);
    }
    Json(rows).into_response()
}

async fn insert_row(
    State(state): State<MockState>,
    Path(table): Path<String>,
    Json(row): Json<Value>,
) -> Response {
    if let Some(response) = state.gate().await {
        return response;
    }
    let stored = {
        let mut inner = state.inner.lock().unwrap();
        store_row(&mut inner, &table, row)
    };
    state.publish(&table, "INSERT", stored.clone());
    (StatusCode::CREATED, Json(vec![stored])).into_response()
}

async fn update_row(
    State(state): State<MockState>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(patch): Json<Value>,
) -> Response {
    if let Some(response) = state.gate().await {
        return response;
    }
    let Some(id) = id_filter(&query) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let updated = {
        let mut inner = state.inner.lock().unwrap();
        let rows = inner.tables.entry(table.clone()).or_default();
        let mut updated = None;
        for row in rows.iter_mut().filter(|row| row["id"] == json!(id)) {
            if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }
            updated = Some(row.clone());
        }
        updated
    };
    if let Some(row) = updated {
        state.publish(&table, "UPDATE", row);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_row(
    State(state): State<MockState>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(response) = state.gate().await {
        return response;
    }
    let Some(id) = id_filter(&query) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let removed = {
        let mut inner = state.inner.lock().unwrap();
        let rows = inner.tables.entry(table.clone()).or_default();
        let before = rows.len();
        rows.retain(|row| row["id"] != json!(id));
        before != rows.len()
    };
    if removed {
        state.publish(&table, "DELETE", json!({ "id": id }));
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn upload_object(
    State(state): State<MockState>,
    Path((bucket, name)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    if let Some(response) = state.gate().await {
        return response;
    }
    state
        .inner
        .lock()
        .unwrap()
        .objects
        .insert(name.clone(), body.to_vec());
    Json(json!({ "Key": format!("{}/{}", bucket, name) })).into_response()
}

async fn realtime(ws: WebSocketUpgrade, State(state): State<MockState>) -> Response {
    ws.on_upgrade(move |socket| realtime_session(socket, state))
}

async fn realtime_session(mut socket: WebSocket, state: MockState) {
    let mut changes = state.changes.subscribe();
    // (topic, table) pairs joined on this socket
    let mut joined: Vec<(String, String)> = Vec::new();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(_)) => continue,
                    _ => break,
                };
                let Ok(frame) = serde_json::from_str::<Value>(text.as_str()) else {
                    continue;
                };
                let topic = frame["topic"].as_str().unwrap_or_default().to_string();
                if frame["event"] == "phx_join" {
                    let table = frame["payload"]["config"]["postgres_changes"][0]["table"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string();
                    joined.push((topic.clone(), table));
                    state.inner.lock().unwrap().joins += 1;
                }
                let reply = json!({
                    "topic": topic,
                    "event": "phx_reply",
                    "payload": { "status": "ok", "response": {} },
                    "ref": frame["ref"],
                });
                if socket.send(Message::Text(reply.to_string().into())).await.is_err() {
                    break;
                }
            }
            change = changes.recv() => {
                let Ok((table, data)) = change else { break };
                for (topic, joined_table) in &joined {
                    if *joined_table != table {
                        continue;
                    }
                    let frame = json!({
                        "topic": topic,
                        "event": "postgres_changes",
                        "payload": { "data": data, "ids": [1] },
                        "ref": null,
                    });
                    if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}
