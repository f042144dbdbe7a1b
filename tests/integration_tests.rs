//! Integration tests for restock-core

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use restock_core::{
    patterns,
    utils::{EnhancedRecordValidator, MemoryStorage},
    AdjustmentJournal, ExpenseBuilder, ExpenseLedger, ExpenseRecord, ExpenseUpdate,
    IncrementStatus, InventoryItem, InventoryStore, LedgerError, LedgerResult, LedgerStore,
    LineItem, PendingAdjustment, ReconcileStatus, RetryPolicy,
};

fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn restock_line(item_id: &str, qty: i64, unit_price: i64) -> LineItem {
    LineItem::restock(
        format!("{item_id} restock"),
        BigDecimal::from(qty),
        BigDecimal::from(unit_price),
        item_id.to_string(),
    )
}

#[tokio::test]
async fn test_restock_lifecycle_keeps_counters_consistent() {
    let storage = MemoryStorage::new();
    let mut ledger = ExpenseLedger::new(storage);

    ledger
        .create_item("item_a".to_string(), "Basmati Rice".to_string())
        .await
        .unwrap();
    ledger
        .create_item("item_b".to_string(), "Sunflower Oil".to_string())
        .await
        .unwrap();

    // Create: two lines referencing A (qty 3) and B (qty 2).
    let bill = patterns::restock_bill(
        "exp1".to_string(),
        "sup1".to_string(),
        "B-1001".to_string(),
        day(3, 1),
        vec![restock_line("item_a", 3, 1200), restock_line("item_b", 2, 600)],
    )
    .unwrap();

    let outcome = ledger.create_expense(bill).await.unwrap();
    assert_eq!(outcome.report.status(), ReconcileStatus::FullyApplied);
    assert_eq!(
        ledger.current_qty("item_a").await.unwrap(),
        BigDecimal::from(3)
    );
    assert_eq!(
        ledger.current_qty("item_b").await.unwrap(),
        BigDecimal::from(2)
    );

    // Edit: A to qty 5, drop B entirely. Net change: A +2, B -2.
    let update = ExpenseUpdate::replace_lines(vec![restock_line("item_a", 5, 1200)]);
    let outcome = ledger.update_expense("exp1", update).await.unwrap();
    assert!(outcome.report.is_clean());
    assert_eq!(
        ledger.current_qty("item_a").await.unwrap(),
        BigDecimal::from(5)
    );
    assert_eq!(
        ledger.current_qty("item_b").await.unwrap(),
        BigDecimal::from(0)
    );

    // Delete: A -5, B untouched since it is no longer linked.
    let report = ledger.delete_expense("exp1").await.unwrap();
    assert!(report.is_clean());
    assert_eq!(
        ledger.current_qty("item_a").await.unwrap(),
        BigDecimal::from(0)
    );
    assert_eq!(
        ledger.current_qty("item_b").await.unwrap(),
        BigDecimal::from(0)
    );
}

#[tokio::test]
async fn test_duplicate_links_on_one_bill_are_summed() {
    let storage = MemoryStorage::new();
    let mut ledger = ExpenseLedger::new(storage);

    ledger
        .create_item("rice".to_string(), "Rice".to_string())
        .await
        .unwrap();

    // The same item appears on two rows of one bill: 2 + 3 = 5.
    let bill = patterns::restock_bill(
        "exp1".to_string(),
        "sup1".to_string(),
        "B-1002".to_string(),
        day(3, 2),
        vec![restock_line("rice", 2, 1200), restock_line("rice", 3, 1150)],
    )
    .unwrap();

    ledger.create_expense(bill).await.unwrap();
    assert_eq!(
        ledger.current_qty("rice").await.unwrap(),
        BigDecimal::from(5)
    );
}

#[tokio::test]
async fn test_unlinked_lines_never_touch_inventory() {
    let storage = MemoryStorage::new();
    let mut ledger = ExpenseLedger::new(storage);

    ledger
        .create_item("rice".to_string(), "Rice".to_string())
        .await
        .unwrap();

    let bill = ExpenseBuilder::new("exp1".to_string(), "sup1".to_string(), "B-1003".to_string())
        .date(day(3, 3))
        .line(LineItem::new(
            "Cleaning supplies".to_string(),
            BigDecimal::from(10),
            BigDecimal::from(40),
        ))
        .build()
        .unwrap();

    let outcome = ledger.create_expense(bill).await.unwrap();
    assert!(outcome.report.is_clean());
    assert!(outcome.report.applied.is_empty());
    assert_eq!(
        ledger.current_qty("rice").await.unwrap(),
        BigDecimal::from(0)
    );
}

#[tokio::test]
async fn test_unknown_inventory_ref_is_skipped_not_fatal() {
    let storage = MemoryStorage::new();
    let mut ledger = ExpenseLedger::new(storage);

    ledger
        .create_item("rice".to_string(), "Rice".to_string())
        .await
        .unwrap();

    // One line targets an item deleted out-of-band; the other must still land.
    let bill = patterns::restock_bill(
        "exp1".to_string(),
        "sup1".to_string(),
        "B-1004".to_string(),
        day(3, 4),
        vec![restock_line("rice", 4, 1200), restock_line("ghost", 9, 100)],
    )
    .unwrap();

    let outcome = ledger.create_expense(bill).await.unwrap();
    assert_eq!(outcome.report.status(), ReconcileStatus::AppliedWithSkips);
    assert_eq!(outcome.report.skipped_unknown, vec!["ghost".to_string()]);
    assert_eq!(
        ledger.current_qty("rice").await.unwrap(),
        BigDecimal::from(4)
    );
}

#[tokio::test]
async fn test_stale_prior_lines_are_rejected_before_any_increment() {
    let storage = MemoryStorage::new();
    let mut ledger = ExpenseLedger::new(storage);

    ledger
        .create_item("rice".to_string(), "Rice".to_string())
        .await
        .unwrap();

    let bill = patterns::restock_bill(
        "exp1".to_string(),
        "sup1".to_string(),
        "B-1005".to_string(),
        day(3, 5),
        vec![restock_line("rice", 3, 1200)],
    )
    .unwrap();
    ledger.create_expense(bill).await.unwrap();

    // The caller read the record before someone else edited it.
    let other_edit = ExpenseUpdate::replace_lines(vec![restock_line("rice", 10, 1200)]);
    ledger.update_expense("exp1", other_edit).await.unwrap();

    let stale = ExpenseUpdate::replace_lines(Vec::new())
        .expecting_prior(vec![restock_line("rice", 3, 1200)]);
    let err = ledger.update_expense("exp1", stale).await.unwrap_err();
    assert!(matches!(err, LedgerError::StaleOldState(_)));

    // The rejected update must not have reconciled anything.
    assert_eq!(
        ledger.current_qty("rice").await.unwrap(),
        BigDecimal::from(10)
    );
}

#[tokio::test]
async fn test_deleted_record_is_terminal() {
    let storage = MemoryStorage::new();
    let mut ledger = ExpenseLedger::new(storage);

    ledger
        .create_item("rice".to_string(), "Rice".to_string())
        .await
        .unwrap();

    let bill = patterns::restock_bill(
        "exp1".to_string(),
        "sup1".to_string(),
        "B-1006".to_string(),
        day(3, 6),
        vec![restock_line("rice", 3, 1200)],
    )
    .unwrap();
    ledger.create_expense(bill).await.unwrap();
    ledger.delete_expense("exp1").await.unwrap();

    let update = ExpenseUpdate::replace_lines(vec![restock_line("rice", 8, 1200)]);
    let err = ledger.update_expense("exp1", update).await.unwrap_err();
    assert!(matches!(err, LedgerError::RecordNotFound(_)));

    let err = ledger.delete_expense("exp1").await.unwrap_err();
    assert!(matches!(err, LedgerError::RecordNotFound(_)));

    // Neither failed mutation reconciled anything twice.
    assert_eq!(
        ledger.current_qty("rice").await.unwrap(),
        BigDecimal::from(0)
    );
}

#[tokio::test]
async fn test_concurrent_edits_lose_no_increment() {
    let storage = MemoryStorage::new();
    let mut ledger = ExpenseLedger::new(storage.clone());

    ledger
        .create_item("rice".to_string(), "Rice".to_string())
        .await
        .unwrap();

    for (id, bill_no, qty) in [("exp1", "B-2001", 3), ("exp2", "B-2002", 4)] {
        let bill = patterns::restock_bill(
            id.to_string(),
            "sup1".to_string(),
            bill_no.to_string(),
            day(4, 1),
            vec![restock_line("rice", qty, 1200)],
        )
        .unwrap();
        ledger.create_expense(bill).await.unwrap();
    }
    assert_eq!(
        ledger.current_qty("rice").await.unwrap(),
        BigDecimal::from(7)
    );

    // Two concurrent edits touch the same counter with different deltas;
    // clones of the storage share state, so both ledgers see the same items.
    let edit_one = {
        let storage = storage.clone();
        tokio::spawn(async move {
            let mut ledger = ExpenseLedger::new(storage);
            let update = ExpenseUpdate::replace_lines(vec![restock_line("rice", 5, 1200)]);
            ledger.update_expense("exp1", update).await
        })
    };
    let edit_two = {
        let storage = storage.clone();
        tokio::spawn(async move {
            let mut ledger = ExpenseLedger::new(storage);
            let update = ExpenseUpdate::replace_lines(vec![restock_line("rice", 10, 1200)]);
            ledger.update_expense("exp2", update).await
        })
    };

    edit_one.await.unwrap().unwrap();
    edit_two.await.unwrap().unwrap();

    // +2 from exp1 and +6 from exp2, in either order: 7 + 8 = 15.
    assert_eq!(
        ledger.current_qty("rice").await.unwrap(),
        BigDecimal::from(15)
    );
}

/// Delegates to [`MemoryStorage`] but fails `increment_qty` while the shared
/// fuse is lit, to exercise the retry-then-journal path.
#[derive(Clone)]
struct FlakyStorage {
    inner: MemoryStorage,
    failures_left: Arc<AtomicU32>,
}

impl FlakyStorage {
    fn new(failures: u32) -> Self {
        Self {
            inner: MemoryStorage::new(),
            failures_left: Arc::new(AtomicU32::new(failures)),
        }
    }
}

#[async_trait]
impl LedgerStore for FlakyStorage {
    async fn save_record(&mut self, record: &ExpenseRecord) -> LedgerResult<()> {
        self.inner.save_record(record).await
    }

    async fn get_record(&self, record_id: &str) -> LedgerResult<Option<ExpenseRecord>> {
        self.inner.get_record(record_id).await
    }

    async fn list_records(&self, supplier_id: Option<&str>) -> LedgerResult<Vec<ExpenseRecord>> {
        self.inner.list_records(supplier_id).await
    }

    async fn update_record(&mut self, record: &ExpenseRecord) -> LedgerResult<()> {
        self.inner.update_record(record).await
    }

    async fn delete_record(&mut self, record_id: &str) -> LedgerResult<()> {
        self.inner.delete_record(record_id).await
    }
}

#[async_trait]
impl InventoryStore for FlakyStorage {
    async fn save_item(&mut self, item: &InventoryItem) -> LedgerResult<()> {
        self.inner.save_item(item).await
    }

    async fn get_item(&self, item_id: &str) -> LedgerResult<Option<InventoryItem>> {
        self.inner.get_item(item_id).await
    }

    async fn list_items(&self) -> LedgerResult<Vec<InventoryItem>> {
        self.inner.list_items().await
    }

    async fn increment_qty(
        &mut self,
        item_id: &str,
        delta: &BigDecimal,
    ) -> LedgerResult<IncrementStatus> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(LedgerError::Storage("simulated timeout".to_string()));
        }
        self.inner.increment_qty(item_id, delta).await
    }
}

#[async_trait]
impl AdjustmentJournal for FlakyStorage {
    async fn record_adjustment(&mut self, adjustment: &PendingAdjustment) -> LedgerResult<()> {
        self.inner.record_adjustment(adjustment).await
    }

    async fn drain_adjustments(&mut self) -> LedgerResult<Vec<PendingAdjustment>> {
        self.inner.drain_adjustments().await
    }

    async fn pending_count(&self) -> LedgerResult<usize> {
        self.inner.pending_count().await
    }
}

#[tokio::test]
async fn test_failed_increment_is_journaled_then_replayed() {
    // Enough failures to exhaust all three attempts of the create.
    let storage = FlakyStorage::new(3);
    let retry = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
    };
    let mut ledger = ExpenseLedger::with_retry_policy(storage, retry);

    ledger
        .create_item("rice".to_string(), "Rice".to_string())
        .await
        .unwrap();

    let bill = patterns::restock_bill(
        "exp1".to_string(),
        "sup1".to_string(),
        "B-3001".to_string(),
        day(5, 1),
        vec![restock_line("rice", 3, 1200)],
    )
    .unwrap();

    // The ledger write succeeds even though the counter could not be bumped.
    let outcome = ledger.create_expense(bill).await.unwrap();
    assert_eq!(outcome.report.status(), ReconcileStatus::AppliedWithPending);
    assert_eq!(outcome.report.pending.len(), 1);
    assert_eq!(outcome.report.pending[0].attempts, 3);
    assert_eq!(ledger.pending_adjustment_count().await.unwrap(), 1);
    assert_eq!(
        ledger.current_qty("rice").await.unwrap(),
        BigDecimal::from(0)
    );

    // Storage recovered; replay settles the journaled delta.
    let report = ledger.replay_pending_adjustments().await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.applied.len(), 1);
    assert_eq!(ledger.pending_adjustment_count().await.unwrap(), 0);
    assert_eq!(
        ledger.current_qty("rice").await.unwrap(),
        BigDecimal::from(3)
    );
}

#[tokio::test]
async fn test_record_validation_rejects_missing_required_fields() {
    let storage = MemoryStorage::new();
    let mut ledger = ExpenseLedger::with_validator(storage, Box::new(EnhancedRecordValidator));

    ledger
        .create_item("rice".to_string(), "Rice".to_string())
        .await
        .unwrap();

    // Missing bill number.
    let no_bill = ExpenseRecord::new(
        "exp1".to_string(),
        "sup1".to_string(),
        BigDecimal::from(100),
        "  ".to_string(),
    );
    let err = ledger.create_expense(no_bill).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    // Missing supplier.
    let no_supplier = ExpenseRecord::new(
        "exp2".to_string(),
        String::new(),
        BigDecimal::from(100),
        "B-1".to_string(),
    );
    let err = ledger.create_expense(no_supplier).await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    // Nothing was reconciled for either rejected record.
    assert_eq!(
        ledger.current_qty("rice").await.unwrap(),
        BigDecimal::from(0)
    );
}

#[tokio::test]
async fn test_list_expenses_filters_by_supplier_newest_first() {
    let storage = MemoryStorage::new();
    let mut ledger = ExpenseLedger::new(storage);

    for (id, supplier, bill_no, date) in [
        ("exp1", "sup1", "B-1", day(1, 10)),
        ("exp2", "sup2", "B-2", day(2, 10)),
        ("exp3", "sup1", "B-3", day(3, 10)),
    ] {
        let bill = ExpenseBuilder::new(id.to_string(), supplier.to_string(), bill_no.to_string())
            .date(date)
            .amount(BigDecimal::from(500))
            .build()
            .unwrap();
        ledger.create_expense(bill).await.unwrap();
    }

    let all = ledger.list_expenses(None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, "exp3");

    let sup1 = ledger.list_expenses(Some("sup1")).await.unwrap();
    assert_eq!(sup1.len(), 2);
    assert!(sup1.iter().all(|record| record.supplier_id == "sup1"));
}

#[test]
fn test_permissive_quantity_deserialization() {
    let parse = |raw: &str| -> LineItem { serde_json::from_str(raw).unwrap() };

    let numeric = parse(
        r#"{"description": "Rice", "quantity": 3, "unit_price": 1200, "total": 3600, "inventory_id": "rice"}"#,
    );
    assert_eq!(numeric.quantity, BigDecimal::from(3));

    let text = parse(
        r#"{"description": "Oil", "quantity": "4.5", "unit_price": 600, "total": 2700}"#,
    );
    assert_eq!(text.quantity, "4.5".parse::<BigDecimal>().unwrap());

    // Malformed values coerce to zero instead of failing the record.
    let junk = parse(
        r#"{"description": "Ghee", "quantity": "a few", "unit_price": 800, "total": 0}"#,
    );
    assert_eq!(junk.quantity, BigDecimal::from(0));

    let null = parse(r#"{"description": "Salt", "quantity": null, "unit_price": 20, "total": 0}"#);
    assert_eq!(null.quantity, BigDecimal::from(0));
}
