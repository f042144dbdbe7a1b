//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Storage abstraction for expense records
///
/// This trait allows the reconciliation core to work with any storage backend
/// (PostgreSQL, MySQL, SQLite, in-memory, etc.) by implementing these methods.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Save a new expense record to storage
    async fn save_record(&mut self, record: &ExpenseRecord) -> LedgerResult<()>;

    /// Get an expense record by ID
    async fn get_record(&self, record_id: &str) -> LedgerResult<Option<ExpenseRecord>>;

    /// List all expense records, optionally filtered by supplier, newest first
    async fn list_records(&self, supplier_id: Option<&str>) -> LedgerResult<Vec<ExpenseRecord>>;

    /// Replace an existing expense record
    async fn update_record(&mut self, record: &ExpenseRecord) -> LedgerResult<()>;

    /// Delete an expense record
    async fn delete_record(&mut self, record_id: &str) -> LedgerResult<()>;
}

/// Outcome of an atomic counter increment
///
/// A missing item is a status, not an error: reconciliation must not fail a
/// ledger write merely because a referenced item was deleted out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncrementStatus {
    /// The delta was applied to the counter
    Applied,
    /// No item with that ID exists; nothing was changed
    UnknownItem,
}

/// Storage abstraction for inventory items and their stock counters
///
/// `increment_qty` is the one primitive reconciliation relies on: it must add
/// the delta to the stored counter atomically (a `$inc`-style operation, an
/// `UPDATE ... SET qty = qty + $1`, or a mutation under a lock), never a
/// read-modify-write on the caller's side. Concurrent increments against the
/// same item must both land.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Save an inventory item to storage
    async fn save_item(&mut self, item: &InventoryItem) -> LedgerResult<()>;

    /// Get an inventory item by ID
    async fn get_item(&self, item_id: &str) -> LedgerResult<Option<InventoryItem>>;

    /// List all inventory items
    async fn list_items(&self) -> LedgerResult<Vec<InventoryItem>>;

    /// Atomically add `delta` to the item's `current_qty`
    ///
    /// Each successful call applies its delta exactly once. Idempotency is
    /// not assumed; callers must not re-issue an increment that succeeded.
    async fn increment_qty(
        &mut self,
        item_id: &str,
        delta: &BigDecimal,
    ) -> LedgerResult<IncrementStatus>;
}

/// Durable queue for stock deltas that could not be applied
///
/// The reconciler journals a delta here after bounded retries fail, then
/// reports the ledger mutation as succeeded-with-pending. An operator (or a
/// periodic task) replays the journal via the reconciler.
#[async_trait]
pub trait AdjustmentJournal: Send + Sync {
    /// Append a pending adjustment to the journal
    async fn record_adjustment(&mut self, adjustment: &PendingAdjustment) -> LedgerResult<()>;

    /// Take and remove every journaled adjustment, oldest first
    async fn drain_adjustments(&mut self) -> LedgerResult<Vec<PendingAdjustment>>;

    /// Number of adjustments currently journaled
    async fn pending_count(&self) -> LedgerResult<usize>;
}

/// Trait for implementing custom expense record validation rules
pub trait RecordValidator: Send + Sync {
    /// Validate a record before saving
    fn validate_record(&self, record: &ExpenseRecord) -> LedgerResult<()>;

    /// Validate record deletion
    fn validate_record_deletion(&self, record_id: &str) -> LedgerResult<()>;
}

/// Default record validator enforcing the required bill fields
pub struct DefaultRecordValidator;

impl RecordValidator for DefaultRecordValidator {
    fn validate_record(&self, record: &ExpenseRecord) -> LedgerResult<()> {
        record.validate()
    }

    fn validate_record_deletion(&self, _record_id: &str) -> LedgerResult<()> {
        Ok(())
    }
}
