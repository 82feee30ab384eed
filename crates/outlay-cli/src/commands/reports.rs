//! Report command implementations

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use outlay_core::analytics::SummaryWindows;
use outlay_core::db::Database;
use outlay_core::models::{BreakdownOptions, GrandTotalBasis};

use super::truncate;

/// Render a period-over-period change
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(pct) if pct > 0.0 => format!("▲ {:.1}%", pct),
        Some(pct) if pct < 0.0 => format!("▼ {:.1}%", pct.abs()),
        Some(_) => "  0.0%".to_string(),
        None => "   new".to_string(),
    }
}

pub fn cmd_summary(db: &Database, reference: &DateTime<FixedOffset>, json: bool) -> Result<()> {
    let summary = db.expense_summary(reference)?;

    if json {
        let output =
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", output);
        return Ok(());
    }

    let windows = SummaryWindows::anchored_at(reference);

    println!();
    println!("📊 Spending Summary");
    println!("   As of {} (weeks start Monday)", windows.today);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total recorded: {:.2}", summary.total);
    println!();
    println!(
        "   {:15} │ {:>12} │ {:>12} │ {:>9}",
        "Period", "Current", "Previous", "Change"
    );
    println!("   ────────────────┼──────────────┼──────────────┼──────────");

    let rows = [
        (
            "This month",
            summary.monthly,
            summary.previous_month,
            summary.monthly_change,
        ),
        (
            "This week",
            summary.weekly,
            summary.previous_week,
            summary.weekly_change,
        ),
        (
            "Last 30 days",
            summary.last_30_days,
            summary.previous_30_days,
            summary.last_30_days_change,
        ),
    ];
    for (label, current, previous, change) in rows {
        println!(
            "   {:15} │ {:>12.2} │ {:>12.2} │ {:>9}",
            label,
            current,
            previous,
            format_change(change)
        );
    }

    Ok(())
}

pub fn cmd_breakdown(db: &Database, categorized_only: bool, json: bool) -> Result<()> {
    let options = BreakdownOptions {
        grand_total: if categorized_only {
            GrandTotalBasis::CategorizedOnly
        } else {
            GrandTotalBasis::AllRecords
        },
    };
    let entries = db.category_breakdown(options)?;

    if json {
        let output =
            serde_json::to_string_pretty(&entries).context("Failed to serialize breakdown")?;
        println!("{}", output);
        return Ok(());
    }

    println!();
    println!("🏷️  Spending by Category");
    println!(
        "   Percentages of {} spending",
        if categorized_only { "categorized" } else { "all" }
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if entries.is_empty() {
        println!("   No categorized spending found.");
        return Ok(());
    }

    println!("   {:25} │ {:>12} │ {:>6}", "Category", "Amount", "%");
    println!("   ──────────────────────────┼──────────────┼───────");

    for entry in &entries {
        println!(
            "   {:25} │ {:>12.2} │ {:>5.1}%",
            truncate(&entry.category.name, 25),
            entry.amount,
            entry.percentage
        );
    }

    Ok(())
}
