//! Change subscriptions and the connection check.

use std::sync::Arc;

use super::Store;
use crate::models::ConnectionStatus;
use crate::remote::{realtime, ChangeEvent, Subscription, MENU_TABLE, ORDERS_TABLE};

impl Store {
    pub fn subscribe_to_menu_items<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ChangeEvent) + Send + Sync + 'static,
    {
        self.subscribe(MENU_TABLE, Arc::new(callback))
    }

    pub fn subscribe_to_orders<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ChangeEvent) + Send + Sync + 'static,
    {
        self.subscribe(ORDERS_TABLE, Arc::new(callback))
    }

    fn subscribe(&self, table: &'static str, callback: realtime::ChangeCallback) -> Subscription {
        let Some(remote) = self.remote.as_ref() else {
            tracing::warn!("Remote not configured, live updates for {} disabled", table);
            return Subscription::noop();
        };

        match realtime::subscribe(remote.config(), table, callback) {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::error!("Failed to set up change feed for {}: {}", table, e);
                Subscription::noop()
            }
        }
    }

    /// Ask the remote service whether it answers. Unconfigured counts as unreachable.
    pub async fn check_connection(&self) -> ConnectionStatus {
        let Some(remote) = self.remote.as_ref() else {
            return ConnectionStatus::Unreachable;
        };

        match remote.ping().await {
            Ok(()) => ConnectionStatus::Reachable,
            Err(e) => {
                tracing::warn!("Remote connection check failed: {}", e);
                ConnectionStatus::Unreachable
            }
        }
    }
}
