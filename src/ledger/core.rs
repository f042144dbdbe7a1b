//! Main ledger orchestrator tying expense mutations to stock reconciliation

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::ledger::{ItemManager, RecordManager};
use crate::reconciliation::{Reconciler, ReconcileReport, RetryPolicy};
use crate::traits::*;
use crate::types::*;

/// A wholesale replacement of an expense record's mutable fields
///
/// Line items are always replaced in full (edit = full replacement); the
/// scalar fields are optional and keep their current value when `None`.
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    /// New bill amount
    pub amount: Option<BigDecimal>,
    /// New expense description
    pub description: Option<String>,
    /// New bill date
    pub date: Option<NaiveDate>,
    /// New bill number
    pub bill_no: Option<String>,
    /// New payment method
    pub payment_method: Option<PaymentMethod>,
    /// Replacement line set
    pub line_items: Vec<LineItem>,
    /// The line set the caller believes is currently persisted
    ///
    /// When present, the update is rejected with
    /// [`LedgerError::StaleOldState`] before any counter is touched if it
    /// does not match the stored record. Reconciliation itself always uses
    /// the authoritative stored lines, never these.
    pub prior_lines: Option<Vec<LineItem>>,
}

impl ExpenseUpdate {
    /// Replace the line set, leaving the scalar fields untouched
    pub fn replace_lines(line_items: Vec<LineItem>) -> Self {
        Self {
            line_items,
            ..Self::default()
        }
    }

    /// Guard the update against concurrent edits of the line set
    pub fn expecting_prior(mut self, prior_lines: Vec<LineItem>) -> Self {
        self.prior_lines = Some(prior_lines);
        self
    }

    fn apply_to(self, mut record: ExpenseRecord) -> ExpenseRecord {
        if let Some(amount) = self.amount {
            record.amount = amount;
        }
        if let Some(description) = self.description {
            record.description = Some(description);
        }
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(bill_no) = self.bill_no {
            record.bill_no = bill_no;
        }
        if let Some(method) = self.payment_method {
            record.payment_method = method;
        }
        record.line_items = self.line_items;
        record.updated_at = chrono::Utc::now().naive_utc();
        record
    }
}

/// Result of a reconciled expense write
#[derive(Debug, Clone)]
pub struct ExpenseOutcome {
    /// The record as persisted
    pub record: ExpenseRecord,
    /// What happened to each affected stock counter
    pub report: ReconcileReport,
}

/// Expense ledger coordinating record mutations with stock reconciliation
///
/// Every create, edit, and delete of an expense record flows through here so
/// each lifecycle transition triggers exactly one reconciliation pass and no
/// transition is skipped. Edits always diff against the stored record's line
/// set, fetched inside the same operation; a deleted record cannot be edited
/// or deleted again (the fetch fails with `RecordNotFound` before any
/// counter is touched).
pub struct ExpenseLedger<S>
where
    S: LedgerStore + InventoryStore + AdjustmentJournal + Clone,
{
    records: RecordManager<S>,
    items: ItemManager<S>,
    reconciler: Reconciler<S>,
}

impl<S> ExpenseLedger<S>
where
    S: LedgerStore + InventoryStore + AdjustmentJournal + Clone,
{
    /// Create a new expense ledger with the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            records: RecordManager::new(storage.clone()),
            items: ItemManager::new(storage.clone()),
            reconciler: Reconciler::new(storage),
        }
    }

    /// Create a new expense ledger with a custom record validator
    pub fn with_validator(storage: S, validator: Box<dyn RecordValidator>) -> Self {
        Self {
            records: RecordManager::with_validator(storage.clone(), validator),
            items: ItemManager::new(storage.clone()),
            reconciler: Reconciler::new(storage),
        }
    }

    /// Create a new expense ledger with a custom retry policy
    pub fn with_retry_policy(storage: S, retry: RetryPolicy) -> Self {
        Self {
            records: RecordManager::new(storage.clone()),
            items: ItemManager::new(storage.clone()),
            reconciler: Reconciler::with_retry_policy(storage, retry),
        }
    }

    // Inventory item operations
    /// Create a new inventory item with an empty counter
    pub async fn create_item(&mut self, id: String, name: String) -> LedgerResult<InventoryItem> {
        self.items.create_item(id, name).await
    }

    /// Get an inventory item by ID
    pub async fn get_item(&self, item_id: &str) -> LedgerResult<Option<InventoryItem>> {
        self.items.get_item(item_id).await
    }

    /// List all inventory items
    pub async fn list_items(&self) -> LedgerResult<Vec<InventoryItem>> {
        self.items.list_items().await
    }

    /// Get an item's current stock counter
    pub async fn current_qty(&self, item_id: &str) -> LedgerResult<BigDecimal> {
        self.items.current_qty(item_id).await
    }

    /// Seed an item's counter with an opening balance
    pub async fn set_opening_qty(
        &mut self,
        item_id: &str,
        qty: BigDecimal,
    ) -> LedgerResult<InventoryItem> {
        self.items.set_opening_qty(item_id, qty).await
    }

    // Expense record operations
    /// Persist a new expense record, then restock its linked items
    pub async fn create_expense(&mut self, record: ExpenseRecord) -> LedgerResult<ExpenseOutcome> {
        self.records.create_record(&record).await?;
        let report = self.reconciler.apply_create(&record.line_items).await?;
        Ok(ExpenseOutcome { record, report })
    }

    /// Get an expense record by ID
    pub async fn get_expense(&self, record_id: &str) -> LedgerResult<Option<ExpenseRecord>> {
        self.records.get_record(record_id).await
    }

    /// List expense records, optionally filtered by supplier, newest first
    pub async fn list_expenses(
        &self,
        supplier_id: Option<&str>,
    ) -> LedgerResult<Vec<ExpenseRecord>> {
        self.records.list_records(supplier_id).await
    }

    /// Replace an expense record and reconcile the net stock change
    ///
    /// The prior line set is fetched from storage here, never taken from the
    /// caller; `update.prior_lines`, when supplied, serves only as a
    /// stale-state guard and is checked before anything is written.
    pub async fn update_expense(
        &mut self,
        record_id: &str,
        update: ExpenseUpdate,
    ) -> LedgerResult<ExpenseOutcome> {
        let existing = self.records.get_record_required(record_id).await?;

        if let Some(prior_lines) = &update.prior_lines {
            if *prior_lines != existing.line_items {
                return Err(LedgerError::StaleOldState(format!(
                    "line items of expense '{record_id}' changed since they were read"
                )));
            }
        }

        let updated = update.apply_to(existing.clone());
        self.records.update_record(&updated).await?;

        let report = self
            .reconciler
            .apply_update(&existing.line_items, &updated.line_items)
            .await?;

        Ok(ExpenseOutcome {
            record: updated,
            report,
        })
    }

    /// Delete an expense record and revert its restock contributions
    pub async fn delete_expense(&mut self, record_id: &str) -> LedgerResult<ReconcileReport> {
        let existing = self.records.get_record_required(record_id).await?;
        self.records.delete_record(record_id).await?;
        self.reconciler.apply_delete(&existing.line_items).await
    }

    // Pending adjustment operations
    /// Re-attempt every journaled stock adjustment
    pub async fn replay_pending_adjustments(&mut self) -> LedgerResult<ReconcileReport> {
        self.reconciler.replay_pending().await
    }

    /// Number of stock adjustments awaiting replay
    pub async fn pending_adjustment_count(&self) -> LedgerResult<usize> {
        self.reconciler.pending_count().await
    }
}
