//! Expense snapshots for the analytics engine

use chrono::{DateTime, TimeZone};
use tracing::debug;

use super::{timestamp_column, Database};
use crate::analytics::{compute_category_breakdown, compute_summary};
use crate::error::Result;
use crate::models::{
    BreakdownOptions, Category, CategoryBreakdownEntry, ExpenseRecord, SummaryResult,
};

impl Database {
    /// Read every expense as an [`ExpenseRecord`]
    ///
    /// Category references that do not resolve come back as `category: None`.
    pub fn list_expense_records(&self) -> Result<Vec<ExpenseRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT e.amount, e.date, c.id, c.name, c.color, c.icon
            FROM expenses e
            LEFT JOIN categories c ON c.id = e.category_id
            ORDER BY e.date, e.created_at
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                let category_id: Option<String> = row.get(2)?;
                let category = match category_id {
                    Some(id) => Some(Category {
                        id,
                        name: row.get(3)?,
                        color: row.get(4)?,
                        icon: row.get(5)?,
                    }),
                    None => None,
                };
                Ok(ExpenseRecord {
                    amount: row.get(0)?,
                    date: timestamp_column(row, 1)?,
                    category,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(count = records.len(), "Loaded expense snapshot");
        Ok(records)
    }

    /// Summary totals over a fresh snapshot
    pub fn expense_summary<Tz: TimeZone>(
        &self,
        reference: &DateTime<Tz>,
    ) -> Result<SummaryResult> {
        let records = self.list_expense_records()?;
        Ok(compute_summary(&records, reference))
    }

    /// Category breakdown over a fresh snapshot
    pub fn category_breakdown(
        &self,
        options: BreakdownOptions,
    ) -> Result<Vec<CategoryBreakdownEntry>> {
        let records = self.list_expense_records()?;
        Ok(compute_category_breakdown(&records, options))
    }
}
