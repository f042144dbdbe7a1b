//! Net stock-change computation between two versions of a bill's line items

use bigdecimal::BigDecimal;
use std::collections::HashMap;

use crate::types::LineItem;

/// Compute the signed net change per inventory item between two line sets
///
/// Every old line linked to an item subtracts its quantity, every new line
/// adds its quantity, and exact-zero entries are dropped so no-op edits issue
/// no writes. Lines without an inventory link never contribute; duplicate
/// links within one set are summed (the same item may legitimately appear on
/// several rows of one bill).
pub fn net_changes(
    old_lines: &[LineItem],
    new_lines: &[LineItem],
) -> HashMap<String, BigDecimal> {
    let mut changes: HashMap<String, BigDecimal> = HashMap::new();

    for line in old_lines {
        if let Some(inventory_id) = &line.inventory_id {
            *changes.entry(inventory_id.clone()).or_default() -= &line.quantity;
        }
    }

    for line in new_lines {
        if let Some(inventory_id) = &line.inventory_id {
            *changes.entry(inventory_id.clone()).or_default() += &line.quantity;
        }
    }

    changes.retain(|_, delta| *delta != BigDecimal::from(0));
    changes
}

/// Net changes for a freshly created record: the straight per-item sum
pub fn changes_for_create(new_lines: &[LineItem]) -> HashMap<String, BigDecimal> {
    net_changes(&[], new_lines)
}

/// Net changes for a deleted record: the negated per-item sum
pub fn changes_for_delete(old_lines: &[LineItem]) -> HashMap<String, BigDecimal> {
    net_changes(old_lines, &[])
}
