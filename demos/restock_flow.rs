//! Restock reconciliation walkthrough

use restock_core::utils::MemoryStorage;
use restock_core::{patterns, ExpenseBuilder, ExpenseLedger, ExpenseUpdate, LineItem};

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🍚 Restock Core - Inventory Reconciliation Example\n");

    // Create a new expense ledger with in-memory storage
    let storage = MemoryStorage::new();
    let mut ledger = ExpenseLedger::new(storage);

    // 1. Set up the stocked items
    println!("📦 Creating inventory items...");
    for (id, name) in [
        ("rice", "Basmati Rice (kg)"),
        ("oil", "Sunflower Oil (L)"),
        ("paneer", "Paneer (kg)"),
    ] {
        let item = ledger.create_item(id.to_string(), name.to_string()).await?;
        println!("  ✓ Created item: {} - {}", item.id, item.name);
    }
    println!();

    // 2. Record a supplier bill that restocks rice and oil
    println!("🧾 Recording supplier bill B-1001...");
    let bill = patterns::restock_bill(
        "exp001".to_string(),
        "sup_sharma_traders".to_string(),
        "B-1001".to_string(),
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        vec![
            LineItem::restock(
                "Basmati rice 25kg bags".to_string(),
                BigDecimal::from(3),
                BigDecimal::from(1200),
                "rice".to_string(),
            ),
            LineItem::restock(
                "Sunflower oil 5L cans".to_string(),
                BigDecimal::from(2),
                BigDecimal::from(600),
                "oil".to_string(),
            ),
        ],
    )?;

    let outcome = ledger.create_expense(bill).await?;
    println!(
        "  ✓ Recorded ₹{} bill, reconciliation: {:?}",
        outcome.record.amount,
        outcome.report.status()
    );
    show_stock(&ledger).await?;

    // 3. Edit the bill: rice goes to 5 bags, oil is dropped
    println!("✏️  Editing bill B-1001 (rice 3 → 5, oil dropped)...");
    let update = ExpenseUpdate::replace_lines(vec![LineItem::restock(
        "Basmati rice 25kg bags".to_string(),
        BigDecimal::from(5),
        BigDecimal::from(1200),
        "rice".to_string(),
    )]);
    let outcome = ledger.update_expense("exp001", update).await?;
    println!("  ✓ Net change applied: {:?}", outcome.report.applied);
    show_stock(&ledger).await?;

    // 4. Record a bill with an unlinked line (no stock effect)
    println!("🧾 Recording bill B-1002 with an unlinked line...");
    let bill = ExpenseBuilder::new(
        "exp002".to_string(),
        "sup_city_supplies".to_string(),
        "B-1002".to_string(),
    )
    .date(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap())
    .line(LineItem::new(
        "Cleaning supplies".to_string(),
        BigDecimal::from(10),
        BigDecimal::from(40),
    ))
    .build()?;
    let outcome = ledger.create_expense(bill).await?;
    println!(
        "  ✓ Recorded; counters touched: {}",
        outcome.report.applied.len()
    );
    show_stock(&ledger).await?;

    // 5. Delete the first bill; its restock contribution is reverted
    println!("🗑️  Deleting bill B-1001...");
    let report = ledger.delete_expense("exp001").await?;
    println!("  ✓ Reverted: {:?}", report.applied);
    show_stock(&ledger).await?;

    println!("Done.");
    Ok(())
}

async fn show_stock<S>(ledger: &ExpenseLedger<S>) -> Result<(), Box<dyn std::error::Error>>
where
    S: restock_core::LedgerStore
        + restock_core::InventoryStore
        + restock_core::AdjustmentJournal
        + Clone,
{
    println!("  Current stock:");
    let mut items = ledger.list_items().await?;
    items.sort_by(|a, b| a.id.cmp(&b.id));
    for item in items {
        println!("    {} = {}", item.name, item.current_qty);
    }
    println!();
    Ok(())
}
