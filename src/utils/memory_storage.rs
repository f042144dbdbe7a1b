//! In-memory storage implementation for testing

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share state, so handing clones to concurrent tasks exercises the
/// same records and counters. `increment_qty` mutates the counter under a
/// single write lock, which is what gives it the atomic-add guarantee
/// in-process.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    records: Arc<RwLock<HashMap<String, ExpenseRecord>>>,
    items: Arc<RwLock<HashMap<String, InventoryItem>>>,
    adjustments: Arc<RwLock<Vec<PendingAdjustment>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            items: Arc::new(RwLock::new(HashMap::new())),
            adjustments: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.records.write().unwrap().clear();
        self.items.write().unwrap().clear();
        self.adjustments.write().unwrap().clear();
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryStorage {
    async fn save_record(&mut self, record: &ExpenseRecord) -> LedgerResult<()> {
        self.records
            .write()
            .unwrap()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_record(&self, record_id: &str) -> LedgerResult<Option<ExpenseRecord>> {
        Ok(self.records.read().unwrap().get(record_id).cloned())
    }

    async fn list_records(&self, supplier_id: Option<&str>) -> LedgerResult<Vec<ExpenseRecord>> {
        let records = self.records.read().unwrap();
        let mut filtered: Vec<ExpenseRecord> = records
            .values()
            .filter(|record| supplier_id.is_none_or(|s| record.supplier_id == s))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(filtered)
    }

    async fn update_record(&mut self, record: &ExpenseRecord) -> LedgerResult<()> {
        if self.records.read().unwrap().contains_key(&record.id) {
            self.records
                .write()
                .unwrap()
                .insert(record.id.clone(), record.clone());
            Ok(())
        } else {
            Err(LedgerError::RecordNotFound(record.id.clone()))
        }
    }

    async fn delete_record(&mut self, record_id: &str) -> LedgerResult<()> {
        if self.records.write().unwrap().remove(record_id).is_some() {
            Ok(())
        } else {
            Err(LedgerError::RecordNotFound(record_id.to_string()))
        }
    }
}

#[async_trait]
impl InventoryStore for MemoryStorage {
    async fn save_item(&mut self, item: &InventoryItem) -> LedgerResult<()> {
        self.items
            .write()
            .unwrap()
            .insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn get_item(&self, item_id: &str) -> LedgerResult<Option<InventoryItem>> {
        Ok(self.items.read().unwrap().get(item_id).cloned())
    }

    async fn list_items(&self) -> LedgerResult<Vec<InventoryItem>> {
        Ok(self.items.read().unwrap().values().cloned().collect())
    }

    async fn increment_qty(
        &mut self,
        item_id: &str,
        delta: &BigDecimal,
    ) -> LedgerResult<IncrementStatus> {
        // Read and write under one lock so concurrent increments both land.
        let mut items = self.items.write().unwrap();
        match items.get_mut(item_id) {
            Some(item) => {
                item.apply_delta(delta);
                Ok(IncrementStatus::Applied)
            }
            None => Ok(IncrementStatus::UnknownItem),
        }
    }
}

#[async_trait]
impl AdjustmentJournal for MemoryStorage {
    async fn record_adjustment(&mut self, adjustment: &PendingAdjustment) -> LedgerResult<()> {
        self.adjustments.write().unwrap().push(adjustment.clone());
        Ok(())
    }

    async fn drain_adjustments(&mut self) -> LedgerResult<Vec<PendingAdjustment>> {
        Ok(std::mem::take(&mut *self.adjustments.write().unwrap()))
    }

    async fn pending_count(&self) -> LedgerResult<usize> {
        Ok(self.adjustments.read().unwrap().len())
    }
}
