//! Reconciliation engine keeping inventory counters consistent with the
//! expense ledger
//!
//! Split in two: [`delta`] computes the signed net change per inventory item
//! between two versions of a bill's line items (pure, no I/O), and [`engine`]
//! durably applies those changes through the storage layer's atomic
//! increment, with bounded retries and a pending-adjustment journal for
//! increments that keep failing.

pub mod delta;
pub mod engine;

pub use delta::{changes_for_create, changes_for_delete, net_changes};
pub use engine::*;
