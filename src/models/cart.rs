//! Shopping cart kept in the session's local storage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Menu item id to quantity. Quantities are always positive; a line that
/// drops to zero is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<i64, u32>,
}

impl Cart {
    pub fn add(&mut self, item_id: i64) {
        let quantity = self.lines.entry(item_id).or_insert(0);
        *quantity = quantity.saturating_add(1);
    }

    pub fn remove(&mut self, item_id: i64) {
        if let Some(quantity) = self.lines.get_mut(&item_id) {
            if *quantity > 1 {
                *quantity -= 1;
            } else {
                self.lines.remove(&item_id);
            }
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = (i64, u32)> + '_ {
        self.lines.iter().map(|(id, quantity)| (*id, *quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of portions across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.values().sum()
    }
}
