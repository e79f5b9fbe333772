//! Client for the hosted database service.
//!
//! Speaks the service's REST dialect for table access, its object-storage API for
//! image uploads, and its websocket change feed (see [`realtime`]).

pub mod realtime;

use std::time::Duration;

use reqwest::{header, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

pub use realtime::{ChangeEvent, Subscription};

pub const MENU_TABLE: &str = "menu_items";
pub const ORDERS_TABLE: &str = "orders";

/// Upper bound on one REST or storage call. A call that runs past it fails as a
/// transport error and the write stays local-only.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint and credential of the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Access key sent as `apikey` and bearer token
    pub key: String,
    /// Object-storage bucket for menu images
    pub image_bucket: String,
}

/// Failure talking to the remote service.
#[derive(Debug)]
pub enum RemoteError {
    /// Connection or protocol failure
    Transport(String),
    /// Service answered with a non-success status
    Status { status: StatusCode, body: String },
    /// Response body did not match the expected shape
    Decode(String),
    /// Insert answered without returning the stored row
    EmptyResponse,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::Transport(msg) => write!(f, "transport error: {}", msg),
            RemoteError::Status { status, body } => write!(f, "service error {}: {}", status, body),
            RemoteError::Decode(msg) => write!(f, "decode error: {}", msg),
            RemoteError::EmptyResponse => write!(f, "service returned no rows"),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for RemoteError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        RemoteError::Transport(err.to_string())
    }
}

/// Sort direction on `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_query(self) -> &'static str {
        match self {
            SortOrder::Ascending => "created_at.asc",
            SortOrder::Descending => "created_at.desc",
        }
    }
}

/// HTTP client bound to one remote project.
#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    config: RemoteConfig,
    timeout: Duration,
}

impl RemoteClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn base(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base(), table)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .timeout(self.timeout)
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }

    /// Fetch every row of `table` ordered by creation time.
    pub async fn list<T: DeserializeOwned>(
        &self,
        table: &str,
        order: SortOrder,
    ) -> Result<Vec<T>, RemoteError> {
        let response = self
            .authorized(self.http.get(self.table_url(table)))
            .query(&[("select", "*"), ("order", order.as_query())])
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Insert one row and return it as stored by the service.
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, RemoteError> {
        let response = self
            .authorized(self.http.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let rows: Vec<T> = check(response).await?.json().await?;
        rows.into_iter().next().ok_or(RemoteError::EmptyResponse)
    }

    /// Apply a partial update to the row with `id`.
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        id: i64,
        patch: &B,
    ) -> Result<(), RemoteError> {
        let response = self
            .authorized(self.http.patch(self.table_url(table)))
            .query(&[("id", format!("eq.{}", id))])
            .json(patch)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    pub async fn delete(&self, table: &str, id: i64) -> Result<(), RemoteError> {
        let response = self
            .authorized(self.http.delete(self.table_url(table)))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Upload an object into the image bucket and return its public URL.
    pub async fn upload_object(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RemoteError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base(),
            self.config.image_bucket,
            name
        );
        let response = self
            .authorized(self.http.post(url))
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        check(response).await?;
        Ok(self.public_url(name))
    }

    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base(),
            self.config.image_bucket,
            name
        )
    }

    /// Lightweight read used by the connection banner.
    pub async fn ping(&self) -> Result<(), RemoteError> {
        let response = self
            .authorized(self.http.get(self.table_url(MENU_TABLE)))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

/// Turn a non-success status into an error carrying the response body.
async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Status { status, body })
}
