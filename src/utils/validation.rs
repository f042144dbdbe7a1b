//! Validation utilities

use bigdecimal::BigDecimal;

use crate::traits::*;
use crate::types::*;

/// Parse a raw quantity value, coercing anything malformed to zero
///
/// The permissive numeric policy of the bill intake path: supplier bill
/// quantities arrive as loosely validated text and must never fail a record,
/// so unparseable input contributes nothing to any counter.
pub fn parse_or_zero(raw: &str) -> BigDecimal {
    raw.trim().parse().unwrap_or_default()
}

/// Validate that an identifier is usable as a storage key
pub fn validate_identifier(id: &str, what: &str) -> LedgerResult<()> {
    if id.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{what} cannot be empty")));
    }

    if id.len() > 50 {
        return Err(LedgerError::Validation(format!(
            "{what} cannot exceed 50 characters"
        )));
    }

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::Validation(format!(
            "{what} can only contain alphanumeric characters, dashes, and underscores"
        )));
    }

    Ok(())
}

/// Validate that a bill number is present and reasonably sized
pub fn validate_bill_no(bill_no: &str) -> LedgerResult<()> {
    if bill_no.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Bill number cannot be empty".to_string(),
        ));
    }

    if bill_no.len() > 50 {
        return Err(LedgerError::Validation(
            "Bill number cannot exceed 50 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that an expense description is reasonably sized
pub fn validate_description(description: &str) -> LedgerResult<()> {
    if description.len() > 500 {
        return Err(LedgerError::Validation(
            "Description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate a single bill line
pub fn validate_line_item(line: &LineItem) -> LedgerResult<()> {
    if line.description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Line item description cannot be empty".to_string(),
        ));
    }

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

    if let Some(inventory_id) = &line.inventory_id {
        validate_identifier(inventory_id, "Inventory ID")?;
    }

    Ok(())
}

/// Enhanced record validator with detailed checks
pub struct EnhancedRecordValidator;

impl RecordValidator for EnhancedRecordValidator {
    fn validate_record(&self, record: &ExpenseRecord) -> LedgerResult<()> {
        // Basic validation (required fields, non-negative lines)
        record.validate()?;

        validate_identifier(&record.id, "Record ID")?;
        validate_identifier(&record.supplier_id, "Supplier ID")?;
        validate_bill_no(&record.bill_no)?;

        if let Some(description) = &record.description {
            validate_description(description)?;
        }

        for line in &record.line_items {
            validate_line_item(line)?;
        }

        Ok(())
    }

    fn validate_record_deletion(&self, record_id: &str) -> LedgerResult<()> {
        validate_identifier(record_id, "Record ID")
    }
}
