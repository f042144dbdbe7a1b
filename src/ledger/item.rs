//! Inventory item management

use bigdecimal::BigDecimal;

use crate::traits::*;
use crate::types::*;

/// Manager for inventory items and their stock counters
pub struct ItemManager<S: InventoryStore> {
    pub(crate) storage: S,
}

impl<S: InventoryStore> ItemManager<S> {
    /// Create a new item manager
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a new inventory item with an empty counter
    pub async fn create_item(&mut self, id: String, name: String) -> LedgerResult<InventoryItem> {
        if id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Item ID cannot be empty".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Item name cannot be empty".to_string(),
            ));
        }

        if self.storage.get_item(&id).await?.is_some() {
            return Err(LedgerError::Validation(format!(
                "Inventory item with ID '{id}' already exists"
            )));
        }

        let item = InventoryItem::new(id, name);
        self.storage.save_item(&item).await?;

        Ok(item)
    }

    /// Get an inventory item by ID
    pub async fn get_item(&self, item_id: &str) -> LedgerResult<Option<InventoryItem>> {
        self.storage.get_item(item_id).await
    }

    /// Get an inventory item by ID, returning an error if not found
    pub async fn get_item_required(&self, item_id: &str) -> LedgerResult<InventoryItem> {
        self.storage
            .get_item(item_id)
            .await?
            .ok_or_else(|| LedgerError::ItemNotFound(item_id.to_string()))
    }

    /// List all inventory items
    pub async fn list_items(&self) -> LedgerResult<Vec<InventoryItem>> {
        self.storage.list_items().await
    }

    /// Get an item's current stock counter
    pub async fn current_qty(&self, item_id: &str) -> LedgerResult<BigDecimal> {
        Ok(self.get_item_required(item_id).await?.current_qty)
    }

    /// Seed an item's counter with an opening balance
    ///
    /// For stock-take corrections outside the ledger, not for restocks; bill
    /// line items must go through reconciliation instead.
    pub async fn set_opening_qty(
        &mut self,
        item_id: &str,
        qty: BigDecimal,
    ) -> LedgerResult<InventoryItem> {
        let mut item = self.get_item_required(item_id).await?;
        item.current_qty = qty;
        item.updated_at = chrono::Utc::now().naive_utc();
        self.storage.save_item(&item).await?;
        Ok(item)
    }
}
