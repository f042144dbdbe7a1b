//! Core types and data structures for the expense ledger and inventory counters

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a supplier bill was settled
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    /// Paid in cash (the default for most supplier bills)
    #[default]
    Cash,
    /// Paid by card
    Card,
    /// Paid via UPI
    Upi,
    /// Settled by bank transfer
    BankTransfer,
}

/// One row of a supplier bill
///
/// A line item optionally restocks an inventory item: when `inventory_id` is
/// set, its `quantity` contributes to that item's stock counter. Lines without
/// a link never affect any counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// What was purchased (free-form label)
    pub description: String,
    /// Units purchased; deserialized permissively (malformed values become 0)
    #[serde(deserialize_with = "permissive_quantity::deserialize")]
    pub quantity: BigDecimal,
    /// Price per unit (display only)
    pub unit_price: BigDecimal,
    /// Line total (display only, never authoritative for reconciliation)
    pub total: BigDecimal,
    /// Inventory item this line restocks, if any
    #[serde(default)]
    pub inventory_id: Option<String>,
    /// Optional free-form annotation
    #[serde(default)]
    pub note: Option<String>,
}

impl LineItem {
    /// Create a plain (non-restock) line item; `total` is derived
    pub fn new(description: String, quantity: BigDecimal, unit_price: BigDecimal) -> Self {
        let total = &quantity * &unit_price;
        Self {
            description,
            quantity,
            unit_price,
            total,
            inventory_id: None,
            note: None,
        }
    }

    /// Create a line item linked to an inventory item
    pub fn restock(
        description: String,
        quantity: BigDecimal,
        unit_price: BigDecimal,
        inventory_id: String,
    ) -> Self {
        let mut line = Self::new(description, quantity, unit_price);
        line.inventory_id = Some(inventory_id);
        line
    }

    /// Attach a note to the line item
    pub fn with_note(mut self, note: String) -> Self {
        self.note = Some(note);
        self
    }

    /// Whether this line contributes to an inventory counter
    pub fn is_restock(&self) -> bool {
        self.inventory_id.is_some()
    }
}

/// A recorded supplier expense (the ledger record)
///
/// Lifecycle: created once with an initial line set, replaced wholesale on
/// edit (any number of times), deleted once. Deletion is terminal. Each of
/// those transitions triggers exactly one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier, assigned at creation
    pub id: String,
    /// Supplier the bill came from
    pub supplier_id: String,
    /// Total bill amount
    pub amount: BigDecimal,
    /// Optional description of the expense
    pub description: Option<String>,
    /// Date the bill was issued
    pub date: NaiveDate,
    /// Supplier's bill number
    pub bill_no: String,
    /// How the bill was settled
    pub payment_method: PaymentMethod,
    /// Bill rows; order is irrelevant to reconciliation and duplicate
    /// inventory links are summed, not deduplicated
    pub line_items: Vec<LineItem>,
    /// When the record was created
    pub created_at: NaiveDateTime,
    /// When the record was last updated
    pub updated_at: NaiveDateTime,
}

impl ExpenseRecord {
    /// Create a new expense record dated today with no line items
    pub fn new(id: String, supplier_id: String, amount: BigDecimal, bill_no: String) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            supplier_id,
            amount,
            description: None,
            date: chrono::Utc::now().date_naive(),
            bill_no,
            payment_method: PaymentMethod::default(),
            line_items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Generate a fresh record identifier
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Append a line item
    pub fn add_line(&mut self, line: LineItem) {
        self.line_items.push(line);
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Iterate over the lines that restock inventory
    pub fn restock_lines(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(|line| line.is_restock())
    }

    /// Validate the record
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.supplier_id.trim().is_empty() {
            return Err(LedgerError::Validation("Supplier is required".to_string()));
        }

        if self.bill_no.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Bill number is required".to_string(),
            ));
        }

        if self.amount <= BigDecimal::from(0) {
            return Err(LedgerError::Validation(
                "Amount must be positive".to_string(),
            ));
        }

        for line in &self.line_items {
            if line.quantity < BigDecimal::from(0) {
                return Err(LedgerError::Validation(format!(
                    "Line '{}' has a negative quantity",
                    line.description
                )));
            }
            if line.unit_price < BigDecimal::from(0) || line.total < BigDecimal::from(0) {
                return Err(LedgerError::Validation(format!(
                    "Line '{}' has a negative price",
                    line.description
                )));
            }
        }

        Ok(())
    }
}

/// A stocked menu component tracked by a single quantity counter
///
/// `current_qty` is the reconciliation target: it must equal the item's
/// baseline plus the summed quantities of every restock line item across all
/// active expense records that link to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Units currently on hand
    pub current_qty: BigDecimal,
    /// When the item was created
    pub created_at: NaiveDateTime,
    /// When the counter was last touched
    pub updated_at: NaiveDateTime,
}

impl InventoryItem {
    /// Create a new inventory item with an empty counter
    pub fn new(id: String, name: String) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            name,
            current_qty: BigDecimal::from(0),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a signed net change to the counter
    ///
    /// Negative stock is allowed, not clamped; a delta that drives the counter
    /// below zero is recorded as-is so the ledger stays the source of truth.
    pub fn apply_delta(&mut self, delta: &BigDecimal) {
        self.current_qty += delta;
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// A stock delta that could not be applied and awaits replay
///
/// Journaled when an increment keeps failing after bounded retries. The
/// owning ledger mutation still reports success so the expense write is never
/// rolled back over a transient storage fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAdjustment {
    /// Inventory item the delta targets
    pub inventory_id: String,
    /// Signed net change still owed to the counter
    pub delta: BigDecimal,
    /// Increment attempts made so far
    pub attempts: u32,
    /// Last storage error observed
    pub last_error: String,
    /// When the adjustment was journaled
    pub recorded_at: NaiveDateTime,
}

impl PendingAdjustment {
    /// Journal a delta after `attempts` failed increments
    pub fn new(inventory_id: String, delta: BigDecimal, attempts: u32, last_error: String) -> Self {
        Self {
            inventory_id,
            delta,
            attempts,
            last_error,
            recorded_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Re-journal after another failed replay attempt
    pub fn retried(mut self, last_error: String) -> Self {
        self.attempts += 1;
        self.last_error = last_error;
        self.recorded_at = chrono::Utc::now().naive_utc();
        self
    }
}

/// Permissive quantity parsing: malformed values coerce to zero, never error
///
/// Supplier bills arrive from loosely validated clients; a quantity may show
/// up as a number, a numeric string, or junk. Reconciliation treats anything
/// unparseable as zero rather than failing the whole record.
pub(crate) mod permissive_quantity {
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawQuantity {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawQuantity::deserialize(deserializer)? {
            RawQuantity::Number(n) => BigDecimal::try_from(n).unwrap_or_default(),
            RawQuantity::Text(s) => s.trim().parse().unwrap_or_default(),
            RawQuantity::Other(_) => BigDecimal::default(),
        })
    }
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Expense record not found: {0}")]
    RecordNotFound(String),
    #[error("Inventory item not found: {0}")]
    ItemNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Stale prior state: {0}")]
    StaleOldState(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
