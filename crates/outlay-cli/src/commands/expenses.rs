//! Expense command implementations

use anyhow::Result;
use chrono::Local;
use outlay_core::db::Database;
use outlay_core::models::{ExpenseFilter, NewExpense};

use super::{local_day_to_utc, parse_date_arg, truncate};

pub fn cmd_expenses_list(db: &Database, limit: i64, category: Option<&str>) -> Result<()> {
    let expenses = db.list_expenses(&ExpenseFilter {
        category_id: category.map(str::to_string),
        limit,
        ..Default::default()
    })?;

    if expenses.is_empty() {
        println!("No expenses found. Record one with:");
        println!("  outlay expenses add 12.50 --category food");
        return Ok(());
    }

    println!();
    println!("💸 Expenses (showing {} of {})", expenses.len(), db.count_expenses()?);
    println!("   ─────────────────────────────────────────────────────────────");

    for item in &expenses {
        let category = item
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Uncategorized");
        let description = item.expense.description.as_deref().unwrap_or("");
        println!(
            "   {} │ {:>10} │ {:18} │ {:24} │ {}",
            item.expense.date.with_timezone(&Local).format("%Y-%m-%d"),
            item.expense.amount,
            truncate(category, 18),
            truncate(description, 24),
            item.expense.id
        );
    }

    Ok(())
}

pub fn cmd_expenses_add(
    db: &Database,
    amount: &str,
    category: Option<&str>,
    date: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    let day = match date {
        Some(d) => parse_date_arg(d, "--date")?,
        None => Local::now().date_naive(),
    };

    let expense = db.create_expense(&NewExpense {
        amount: amount.to_string(),
        description: description.map(str::to_string),
        category_id: category.map(str::to_string),
        date: local_day_to_utc(day)?,
    })?;

    println!(
        "✅ Recorded {} on {} (id: {})",
        expense.amount, day, expense.id
    );
    if expense.category_id.is_none() {
        println!("   💡 Tip: use --category to include it in the category breakdown");
    }

    Ok(())
}

pub fn cmd_expenses_delete(db: &Database, id: &str) -> Result<()> {
    db.delete_expense(id)?;
    println!("🗑️  Deleted expense {}", id);
    Ok(())
}
