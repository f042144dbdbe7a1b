//! Apply/commit orchestration for computed stock changes

use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::reconciliation::delta;
use crate::traits::{AdjustmentJournal, IncrementStatus, InventoryStore};
use crate::types::{LedgerResult, LineItem, PendingAdjustment};

/// Bounded retry with exponential backoff for failed increments
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per increment, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// Retry immediately with a single attempt and no backoff
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    fn delay_before_retry(&self, failed_attempts: u32) -> Duration {
        // Exponential: base, 2*base, 4*base, ... capped at 2^6.
        self.base_delay * 2u32.pow(failed_attempts.saturating_sub(1).min(6))
    }
}

/// Overall outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStatus {
    /// Every delta landed on its counter
    FullyApplied,
    /// Some deltas targeted items that no longer exist and were skipped
    AppliedWithSkips,
    /// Some deltas were journaled for later replay after retries failed
    AppliedWithPending,
}

/// Per-item detail of one reconciliation pass
///
/// Callers are expected to persist or log the pending case so journaled
/// deltas are not silently lost; it surfaces as an operator-visible warning,
/// never as an end-user-facing failure.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Deltas successfully applied, keyed by inventory item
    pub applied: Vec<(String, BigDecimal)>,
    /// Inventory IDs that no longer resolve to an item
    pub skipped_unknown: Vec<String>,
    /// Deltas journaled after retries were exhausted
    pub pending: Vec<PendingAdjustment>,
}

impl ReconcileReport {
    /// Collapse the report into its overall status
    ///
    /// Pending deltas dominate skips: a journaled delta still owes the
    /// counter a write, a skipped one never will.
    pub fn status(&self) -> ReconcileStatus {
        if !self.pending.is_empty() {
            ReconcileStatus::AppliedWithPending
        } else if !self.skipped_unknown.is_empty() {
            ReconcileStatus::AppliedWithSkips
        } else {
            ReconcileStatus::FullyApplied
        }
    }

    /// Whether every delta landed with nothing skipped or journaled
    pub fn is_clean(&self) -> bool {
        self.status() == ReconcileStatus::FullyApplied
    }
}

/// The reconciler: computes net stock changes and durably applies them
///
/// Owns neither the expense record nor the inventory item storage, only the
/// delta computation and the orchestration of applying deltas through the
/// store's atomic increment. It never reads a counter before writing, so two
/// concurrent reconciliations against the same item cannot lose an update;
/// that guarantee is delegated entirely to `increment_qty`.
///
/// No atomicity is promised across different items within one pass: deltas
/// apply in any order and may land partially, with failures journaled rather
/// than rolled back.
pub struct Reconciler<S: InventoryStore + AdjustmentJournal> {
    store: S,
    retry: RetryPolicy,
}

impl<S: InventoryStore + AdjustmentJournal> Reconciler<S> {
    /// Create a reconciler with the default retry policy
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a reconciler with a custom retry policy
    pub fn with_retry_policy(store: S, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Reconcile a newly persisted expense record
    pub async fn apply_create(&mut self, new_lines: &[LineItem]) -> LedgerResult<ReconcileReport> {
        self.commit(delta::changes_for_create(new_lines)).await
    }

    /// Reconcile a wholesale line-item replacement
    ///
    /// `old_lines` must be the exact set that was in effect immediately
    /// before the replacement, fetched from the persisted record. Feeding
    /// client-asserted prior state here silently desynchronizes counters;
    /// [`crate::ledger::ExpenseLedger`] enforces this by always fetching the
    /// authoritative record inside the same operation.
    pub async fn apply_update(
        &mut self,
        old_lines: &[LineItem],
        new_lines: &[LineItem],
    ) -> LedgerResult<ReconcileReport> {
        self.commit(delta::net_changes(old_lines, new_lines)).await
    }

    /// Reconcile a deleted expense record
    pub async fn apply_delete(&mut self, old_lines: &[LineItem]) -> LedgerResult<ReconcileReport> {
        self.commit(delta::changes_for_delete(old_lines)).await
    }

    /// Re-attempt every journaled adjustment
    ///
    /// Adjustments that still fail are re-journaled with their attempt count
    /// bumped; ones whose item has vanished are dropped as skips.
    pub async fn replay_pending(&mut self) -> LedgerResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for adjustment in self.store.drain_adjustments().await? {
            match self
                .increment_with_retry(&adjustment.inventory_id, &adjustment.delta)
                .await
            {
                Ok(IncrementStatus::Applied) => {
                    debug!(
                        inventory_id = %adjustment.inventory_id,
                        delta = %adjustment.delta,
                        "replayed pending stock adjustment"
                    );
                    report
                        .applied
                        .push((adjustment.inventory_id, adjustment.delta));
                }
                Ok(IncrementStatus::UnknownItem) => {
                    warn!(
                        inventory_id = %adjustment.inventory_id,
                        "inventory item gone, dropping pending adjustment"
                    );
                    report.skipped_unknown.push(adjustment.inventory_id);
                }
                Err(err) => {
                    let adjustment = adjustment.retried(err.to_string());
                    self.store.record_adjustment(&adjustment).await?;
                    warn!(
                        inventory_id = %adjustment.inventory_id,
                        attempts = adjustment.attempts,
                        "pending stock adjustment still failing, re-journaled"
                    );
                    report.pending.push(adjustment);
                }
            }
        }

        Ok(report)
    }

    /// Number of adjustments currently journaled
    pub async fn pending_count(&self) -> LedgerResult<usize> {
        self.store.pending_count().await
    }

    /// Durably apply each non-zero delta through the store's atomic increment
    async fn commit(
        &mut self,
        changes: HashMap<String, BigDecimal>,
    ) -> LedgerResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for (inventory_id, delta) in changes {
            match self.increment_with_retry(&inventory_id, &delta).await {
                Ok(IncrementStatus::Applied) => {
                    debug!(inventory_id = %inventory_id, delta = %delta, "stock counter adjusted");
                    report.applied.push((inventory_id, delta));
                }
                Ok(IncrementStatus::UnknownItem) => {
                    // Deliberate leniency: the item was deleted out-of-band
                    // and the ledger write must not fail because of it.
                    warn!(
                        inventory_id = %inventory_id,
                        delta = %delta,
                        "inventory item not found, skipping stock adjustment"
                    );
                    report.skipped_unknown.push(inventory_id);
                }
                Err(err) => {
                    let adjustment = PendingAdjustment::new(
                        inventory_id,
                        delta,
                        self.retry.max_attempts,
                        err.to_string(),
                    );
                    self.store.record_adjustment(&adjustment).await?;
                    warn!(
                        inventory_id = %adjustment.inventory_id,
                        delta = %adjustment.delta,
                        error = %adjustment.last_error,
                        "stock increment failed after retries, journaled for replay"
                    );
                    report.pending.push(adjustment);
                }
            }
        }

        Ok(report)
    }

    async fn increment_with_retry(
        &mut self,
        inventory_id: &str,
        delta: &BigDecimal,
    ) -> LedgerResult<IncrementStatus> {
        let mut failed_attempts = 0;

        loop {
            match self.store.increment_qty(inventory_id, delta).await {
                Ok(status) => return Ok(status),
                Err(err) => {
                    failed_attempts += 1;
                    if failed_attempts >= self.retry.max_attempts {
                        return Err(err);
                    }
                    tokio::time::sleep(self.retry.delay_before_retry(failed_attempts)).await;
                }
            }
        }
    }
}
