//! Expense record management

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::traits::*;
use crate::types::*;

/// Manager for validated expense record CRUD
pub struct RecordManager<S: LedgerStore> {
    storage: S,
    validator: Box<dyn RecordValidator>,
}

impl<S: LedgerStore> RecordManager<S> {
    /// Create a new record manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultRecordValidator),
        }
    }

    /// Create a new record manager with a custom validator
    pub fn with_validator(storage: S, validator: Box<dyn RecordValidator>) -> Self {
        Self { storage, validator }
    }

    /// Persist a new expense record
    pub async fn create_record(&mut self, record: &ExpenseRecord) -> LedgerResult<()> {
        self.validator.validate_record(record)?;

        if self.storage.get_record(&record.id).await?.is_some() {
            return Err(LedgerError::Validation(format!(
                "Expense record with ID '{}' already exists",
                record.id
            )));
        }

        self.storage.save_record(record).await
    }

    /// Get an expense record by ID
    pub async fn get_record(&self, record_id: &str) -> LedgerResult<Option<ExpenseRecord>> {
        self.storage.get_record(record_id).await
    }

    /// Get an expense record by ID, returning an error if not found
    pub async fn get_record_required(&self, record_id: &str) -> LedgerResult<ExpenseRecord> {
        self.storage
            .get_record(record_id)
            .await?
            .ok_or_else(|| LedgerError::RecordNotFound(record_id.to_string()))
    }

    /// List expense records, optionally filtered by supplier, newest first
    pub async fn list_records(
        &self,
        supplier_id: Option<&str>,
    ) -> LedgerResult<Vec<ExpenseRecord>> {
        self.storage.list_records(supplier_id).await
    }

    /// Replace an existing expense record
    pub async fn update_record(&mut self, record: &ExpenseRecord) -> LedgerResult<()> {
        self.validator.validate_record(record)?;

        if self.storage.get_record(&record.id).await?.is_none() {
            return Err(LedgerError::RecordNotFound(record.id.clone()));
        }

        self.storage.update_record(record).await
    }

    /// Delete an expense record
    pub async fn delete_record(&mut self, record_id: &str) -> LedgerResult<()> {
        self.validator.validate_record_deletion(record_id)?;

        if self.storage.get_record(record_id).await?.is_none() {
            return Err(LedgerError::RecordNotFound(record_id.to_string()));
        }

        self.storage.delete_record(record_id).await
    }
}

/// Builder for assembling expense records
#[derive(Debug)]
pub struct ExpenseBuilder {
    record: ExpenseRecord,
    amount_set: bool,
}

impl ExpenseBuilder {
    /// Start a new bill for a supplier
    ///
    /// The amount defaults to the sum of line totals unless set explicitly.
    pub fn new(id: String, supplier_id: String, bill_no: String) -> Self {
        Self {
            record: ExpenseRecord::new(id, supplier_id, BigDecimal::from(0), bill_no),
            amount_set: false,
        }
    }

    /// Set the bill amount explicitly
    pub fn amount(mut self, amount: BigDecimal) -> Self {
        self.record.amount = amount;
        self.amount_set = true;
        self
    }

    /// Set the bill date
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.record.date = date;
        self
    }

    /// Set the expense description
    pub fn description(mut self, description: String) -> Self {
        self.record.description = Some(description);
        self
    }

    /// Set the payment method
    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.record.payment_method = method;
        self
    }

    /// Add a line item
    pub fn line(mut self, line: LineItem) -> Self {
        self.record.add_line(line);
        self
    }

    /// Add a restock line linked to an inventory item
    pub fn restock_line(
        self,
        description: String,
        quantity: BigDecimal,
        unit_price: BigDecimal,
        inventory_id: String,
    ) -> Self {
        self.line(LineItem::restock(
            description,
            quantity,
            unit_price,
            inventory_id,
        ))
    }

    /// Build and validate the record
    pub fn build(mut self) -> LedgerResult<ExpenseRecord> {
        if !self.amount_set {
            self.record.amount = self
                .record
                .line_items
                .iter()
                .map(|line| &line.total)
                .sum();
        }
        self.record.validate()?;
        Ok(self.record)
    }
}

/// Common expense record patterns
pub mod patterns {
    use super::*;

    /// A bill where every line restocks a linked inventory item
    pub fn restock_bill(
        id: String,
        supplier_id: String,
        bill_no: String,
        date: NaiveDate,
        lines: Vec<LineItem>,
    ) -> LedgerResult<ExpenseRecord> {
        let mut builder = ExpenseBuilder::new(id, supplier_id, bill_no).date(date);
        for line in lines {
            builder = builder.line(line);
        }
        builder.build()
    }

    /// A single-line restock purchase
    #[allow(clippy::too_many_arguments)]
    pub fn single_restock(
        id: String,
        supplier_id: String,
        bill_no: String,
        date: NaiveDate,
        description: String,
        quantity: BigDecimal,
        unit_price: BigDecimal,
        inventory_id: String,
    ) -> LedgerResult<ExpenseRecord> {
        ExpenseBuilder::new(id, supplier_id, bill_no)
            .date(date)
            .restock_line(description, quantity, unit_price, inventory_id)
            .build()
    }
}
