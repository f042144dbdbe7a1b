//! # Restock Core
//!
//! The inventory reconciliation core of a restaurant back-office system:
//! keeps every menu item's stock counter consistent with a ledger of
//! supplier-expense restock line items, across create, edit, and delete of
//! expense records.
//!
//! ## Features
//!
//! - **Delta computation**: net per-item stock change between two versions of
//!   a bill's line items, with duplicate links summed and no-op edits free
//! - **Atomic commit orchestration**: deltas applied through the storage
//!   layer's atomic increment, never read-modify-write, so concurrent edits
//!   against the same item cannot lose updates
//! - **Failure compensation**: bounded retries with backoff, then a durable
//!   pending-adjustment journal replayable by an operator
//! - **Expense ledger facade**: validated CRUD that triggers exactly one
//!   reconciliation per record lifecycle transition and rejects stale prior
//!   state before any counter is touched
//! - **Storage abstraction**: database-agnostic design with trait-based
//!   ledger, inventory, and journal backends
//!
//! ## Quick Start
//!
//! ```rust
//! use restock_core::{ExpenseBuilder, ExpenseLedger};
//! use restock_core::utils::MemoryStorage;
//! use bigdecimal::BigDecimal;
//!
//! # async fn demo() -> restock_core::LedgerResult<()> {
//! let mut ledger = ExpenseLedger::new(MemoryStorage::new());
//! ledger.create_item("rice".to_string(), "Basmati Rice".to_string()).await?;
//!
//! let bill = ExpenseBuilder::new("exp1".into(), "sup1".into(), "B-1001".into())
//!     .restock_line("Rice 25kg".into(), BigDecimal::from(3), BigDecimal::from(1200), "rice".into())
//!     .build()?;
//! let outcome = ledger.create_expense(bill).await?;
//! assert!(outcome.report.is_clean());
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use ledger::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;

// Re-export record patterns for convenience
pub use ledger::record::patterns;
