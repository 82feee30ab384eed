//! Category command implementations

use anyhow::Result;
use outlay_core::db::Database;
use outlay_core::models::NewCategory;

pub fn cmd_categories_list(db: &Database) -> Result<()> {
    let categories = db.list_categories()?;

    if categories.is_empty() {
        println!("No categories found. Run 'outlay init' to seed default categories.");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:15} │ {:22} │ {:8} │ {:>8}",
        "ID", "Name", "Color", "Expenses"
    );
    println!("   ────────────────┼────────────────────────┼──────────┼─────────");

    for category in &categories {
        let count = db.count_expenses_in_category(&category.id)?;
        println!(
            "   {:15} │ {:22} │ {:8} │ {:>8}",
            super::truncate(&category.id, 15),
            super::truncate(&category.name, 22),
            category.color,
            count
        );
    }

    Ok(())
}

pub fn cmd_categories_add(
    db: &Database,
    name: &str,
    color: Option<&str>,
    icon: Option<&str>,
) -> Result<()> {
    let category = db.create_category(&NewCategory {
        name: name.to_string(),
        color: color.map(str::to_string),
        icon: icon.map(str::to_string),
    })?;

    println!(
        "✅ Created category '{}' (id: {})",
        category.name, category.id
    );

    Ok(())
}

pub fn cmd_categories_delete(db: &Database, id: &str, force: bool) -> Result<()> {
    let in_use = db.count_expenses_in_category(id)?;
    if in_use > 0 && !force {
        println!(
            "⚠️  Category '{}' is used by {} expense(s). Use --force to delete it anyway;",
            id, in_use
        );
        println!("   those expenses will become uncategorized.");
        anyhow::bail!("Category {} is still in use", id);
    }

    let result = db.delete_category(id, force)?;

    if result.expenses_uncategorized > 0 {
        println!(
            "🗑️  Deleted category '{}' ({} expense(s) now uncategorized)",
            id, result.expenses_uncategorized
        );
    } else {
        println!("🗑️  Deleted category '{}'", id);
    }

    Ok(())
}
