//! Order operations. Completing an order deletes it.

use chrono::Utc;

use super::{Store, WriteOutcome};
use crate::errors::AppError;
use crate::models::{NewOrder, Order, PendingOrderInsert};
use crate::remote::{SortOrder, ORDERS_TABLE};

impl Store {
    /// List orders, newest first when served by the remote service.
    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        let fetched = self
            .attempt_remote("list orders", |remote| {
                remote.list::<Order>(ORDERS_TABLE, SortOrder::Descending)
            })
            .await;

        let _guard = self.writes.lock().await;
        match fetched {
            Some(orders) => {
                self.local.save_orders(&orders).await?;
                Ok(orders)
            }
            None => self.local_orders().await,
        }
    }

    /// Callers hold the write guard.
    async fn local_orders(&self) -> Result<Vec<Order>, AppError> {
        if let Some(orders) = self.local.orders().await? {
            return Ok(orders);
        }
        self.local.save_orders(&[]).await?;
        Ok(Vec::new())
    }

    pub async fn list_pending_orders(&self) -> Result<Vec<Order>, AppError> {
        let orders = self.list_orders().await?;
        Ok(orders.into_iter().filter(Order::is_pending).collect())
    }

    /// Record a new pending order. The total is taken as given; it is
    /// computed from the line snapshots before reaching this layer.
    pub async fn create_order(&self, order: NewOrder) -> Result<WriteOutcome<Order>, AppError> {
        let local_order = order
            .clone()
            .into_order(self.ids.next(), Utc::now().to_rfc3339());

        {
            let _guard = self.writes.lock().await;
            let mut orders = self.local_orders().await?;
            orders.push(local_order.clone());
            self.local.save_orders(&orders).await?;
        }

        let insert = PendingOrderInsert::new(&order);
        let remote_order = self
            .attempt_remote("create order", |remote| {
                remote.insert::<_, Order>(ORDERS_TABLE, &insert)
            })
            .await;

        match remote_order {
            Some(remote_order) => {
                let _guard = self.writes.lock().await;
                let mut orders = self.local_orders().await?;
                if let Some(position) = orders.iter().position(|entry| entry.id == local_order.id) {
                    orders[position] = remote_order.clone();
                } else if !orders.iter().any(|entry| entry.id == remote_order.id) {
                    // A refresh replaced the mirror before the insert landed.
                    orders.push(remote_order.clone());
                }
                self.local.save_orders(&orders).await?;
                Ok(WriteOutcome::Synced(remote_order))
            }
            None => Ok(WriteOutcome::LocalOnly(local_order)),
        }
    }

    pub async fn delete_order(&self, id: i64) -> Result<WriteOutcome<()>, AppError> {
        {
            let _guard = self.writes.lock().await;
            let mut orders = self.local_orders().await?;
            orders.retain(|order| order.id != id);
            self.local.save_orders(&orders).await?;
        }

        let synced = self
            .attempt_remote("delete order", |remote| remote.delete(ORDERS_TABLE, id))
            .await
            .is_some();

        Ok(WriteOutcome::from_remote(synced, ()))
    }
}
