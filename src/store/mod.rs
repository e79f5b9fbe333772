//! Data-access layer over the remote service and the local mirror.
//!
//! Routing policy, applied uniformly by every operation:
//! - reads prefer the remote service and refresh the mirror on success, falling
//!   back to the mirror (or the built-in seed) otherwise;
//! - writes always commit to the mirror first, then attempt the same write
//!   remotely on a best-effort basis, with no retry or queue;
//! - an unconfigured remote is not an error: the mirror is the sole source.
//!
//! Remote failures are logged and absorbed. Local failures propagate.
//!
//! Mirror updates are serialized by a write guard that is released before any
//! remote call, so a slow service never blocks other writers.

mod ids;
mod images;
mod live;
mod menu;
mod orders;
mod seed;

pub use ids::IdGenerator;
pub use images::ImageUpload;
pub use seed::seed_menu_items;

use std::future::Future;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::db::LocalStore;
use crate::remote::{RemoteClient, RemoteError};

/// Where a write landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    /// Committed locally and accepted by the remote service
    Synced(T),
    /// Committed locally only; the remote was unconfigured or failed
    LocalOnly(T),
}

/// Serialized form of a write outcome for API envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    Synced,
    LocalOnly,
}

impl<T> WriteOutcome<T> {
    fn from_remote(synced: bool, value: T) -> Self {
        if synced {
            WriteOutcome::Synced(value)
        } else {
            WriteOutcome::LocalOnly(value)
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, WriteOutcome::Synced(_))
    }

    pub fn sync_state(&self) -> SyncState {
        match self {
            WriteOutcome::Synced(_) => SyncState::Synced,
            WriteOutcome::LocalOnly(_) => SyncState::LocalOnly,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            WriteOutcome::Synced(value) | WriteOutcome::LocalOnly(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            WriteOutcome::Synced(value) | WriteOutcome::LocalOnly(value) => value,
        }
    }
}

/// Owns both store handles for the lifetime of the process.
pub struct Store {
    local: LocalStore,
    remote: Option<RemoteClient>,
    ids: IdGenerator,
    /// Held across every read-modify-write of a mirror entry.
    writes: Mutex<()>,
}

impl Store {
    pub fn new(local: LocalStore, remote: Option<RemoteClient>) -> Self {
        Self {
            local,
            remote,
            ids: IdGenerator::new(),
            writes: Mutex::new(()),
        }
    }

    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    #[cfg(test)]
    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Run `call` against the remote service if one is configured.
    ///
    /// Returns `None` in offline mode or when the call fails; failures are logged.
    async fn attempt_remote<'a, R, F, Fut>(&'a self, operation: &str, call: F) -> Option<R>
    where
        F: FnOnce(&'a RemoteClient) -> Fut,
        Fut: Future<Output = Result<R, RemoteError>>,
    {
        let Some(remote) = self.remote.as_ref() else {
            tracing::debug!("Remote not configured, {} uses local storage only", operation);
            return None;
        };

        match call(remote).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Remote {} failed, keeping local state: {}", operation, e);
                None
            }
        }
    }
}
