//! Ledger module containing expense record and inventory item management

pub mod core;
pub mod item;
pub mod record;

pub use core::*;
pub use item::*;
pub use record::*;
