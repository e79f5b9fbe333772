//! Menu item operations.

use chrono::Utc;

use super::{seed_menu_items, Store, WriteOutcome};
use crate::errors::AppError;
use crate::models::{MenuItem, MenuItemPatch, NewMenuItem};
use crate::remote::{SortOrder, MENU_TABLE};

impl Store {
    /// List menu items, oldest first.
    pub async fn list_menu_items(&self) -> Result<Vec<MenuItem>, AppError> {
        let fetched = self
            .attempt_remote("list menu items", |remote| {
                remote.list::<MenuItem>(MENU_TABLE, SortOrder::Ascending)
            })
            .await;

        let _guard = self.writes.lock().await;
        match fetched {
            Some(items) => {
                self.local.save_menu_items(&items).await?;
                Ok(items)
            }
            None => self.local_menu_items().await,
        }
    }

    /// Mirror contents, initialising the mirror from the seed on first use.
    /// Callers hold the write guard.
    async fn local_menu_items(&self) -> Result<Vec<MenuItem>, AppError> {
        if let Some(items) = self.local.menu_items().await? {
            return Ok(items);
        }
        let seed = seed_menu_items();
        self.local.save_menu_items(&seed).await?;
        Ok(seed)
    }

    pub async fn create_menu_item(
        &self,
        item: NewMenuItem,
    ) -> Result<WriteOutcome<MenuItem>, AppError> {
        let local_item = item
            .clone()
            .into_item(self.ids.next(), Utc::now().to_rfc3339());

        {
            let _guard = self.writes.lock().await;
            let mut items = self.local_menu_items().await?;
            items.push(local_item.clone());
            self.local.save_menu_items(&items).await?;
        }

        let remote_item = self
            .attempt_remote("create menu item", |remote| {
                remote.insert::<_, MenuItem>(MENU_TABLE, &item)
            })
            .await;

        match remote_item {
            Some(remote_item) => {
                // The service assigns its own id; converge the mirror on it.
                let _guard = self.writes.lock().await;
                let mut items = self.local_menu_items().await?;
                if let Some(position) = items.iter().position(|entry| entry.id == local_item.id) {
                    items[position] = remote_item.clone();
                } else if !items.iter().any(|entry| entry.id == remote_item.id) {
                    // A refresh replaced the mirror before the insert landed.
                    items.push(remote_item.clone());
                }
                self.local.save_menu_items(&items).await?;
                Ok(WriteOutcome::Synced(remote_item))
            }
            None => Ok(WriteOutcome::LocalOnly(local_item)),
        }
    }

    /// Merge `patch` into the item with `id`. Yields the updated mirror entry,
    /// or `None` when the mirror does not hold that id.
    pub async fn update_menu_item(
        &self,
        id: i64,
        patch: MenuItemPatch,
    ) -> Result<WriteOutcome<Option<MenuItem>>, AppError> {
        let updated = {
            let _guard = self.writes.lock().await;
            let mut items = self.local_menu_items().await?;
            let mut updated = None;
            for item in items.iter_mut().filter(|item| item.id == id) {
                patch.apply(item);
                updated = Some(item.clone());
            }
            self.local.save_menu_items(&items).await?;
            updated
        };

        let synced = self
            .attempt_remote("update menu item", |remote| {
                remote.update(MENU_TABLE, id, &patch)
            })
            .await
            .is_some();

        Ok(WriteOutcome::from_remote(synced, updated))
    }

    pub async fn delete_menu_item(&self, id: i64) -> Result<WriteOutcome<()>, AppError> {
        {
            let _guard = self.writes.lock().await;
            let mut items = self.local_menu_items().await?;
            items.retain(|item| item.id != id);
            self.local.save_menu_items(&items).await?;
        }

        let synced = self
            .attempt_remote("delete menu item", |remote| remote.delete(MENU_TABLE, id))
            .await
            .is_some();

        Ok(WriteOutcome::from_remote(synced, ()))
    }
}
