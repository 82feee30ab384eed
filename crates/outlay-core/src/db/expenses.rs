//! Expense CRUD

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rusqlite::{params, OptionalExtension};

use super::categories::get_category_with_conn;
use super::{format_timestamp, new_id, timestamp_column, Database, DbConn};
use crate::analytics::parse_amount;
use crate::error::{Error, Result};
use crate::models::{
    Category, Expense, ExpenseFilter, ExpenseUpdate, ExpenseWithCategory, NewExpense,
};

const EXPENSE_COLUMNS: &str = r#"
    e.id, e.amount, e.description, e.category_id, e.date, e.created_at, e.updated_at,
    c.id, c.name, c.color, c.icon
"#;

/// Largest amount a single expense may record
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Validate an amount for storage, returning the trimmed text
///
/// Stored amounts must be non-negative decimals no larger than [`MAX_AMOUNT`].
/// The text itself is kept so the precision the caller wrote is preserved.
fn validate_amount(raw: &str) -> Result<String> {
    let amount = parse_amount(raw)
        .ok_or_else(|| Error::InvalidData(format!("Invalid amount '{}'", raw)))?;
    if amount < Decimal::ZERO {
        return Err(Error::InvalidData(format!(
            "Amount cannot be negative: {}",
            raw
        )));
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(Error::InvalidData(format!(
            "Amount exceeds the maximum of {}: {}",
            MAX_AMOUNT,
            raw.trim()
        )));
    }
    Ok(raw.trim().to_string())
}

/// The UTC instant at which `day` begins at `offset`
fn day_start_utc(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = day.and_time(NaiveTime::MIN);
    let offset = Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&(local_midnight - offset))
}

fn ensure_category_exists(conn: &DbConn, category_id: Option<&str>) -> Result<()> {
    if let Some(id) = category_id {
        if get_category_with_conn(conn, id)?.is_none() {
            return Err(Error::NotFound(format!("Category {}", id)));
        }
    }
    Ok(())
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Map a row selected with `EXPENSE_COLUMNS`
fn row_to_expense_with_category(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<ExpenseWithCategory> {
    let category_id: Option<String> = row.get(7)?;
    let category = match category_id {
        Some(id) => Some(Category {
            id,
            name: row.get(8)?,
            color: row.get(9)?,
            icon: row.get(10)?,
        }),
        None => None,
    };

    Ok(ExpenseWithCategory {
        expense: Expense {
            id: row.get(0)?,
            amount: row.get(1)?,
            description: row.get(2)?,
            category_id: row.get(3)?,
            date: timestamp_column(row, 4)?,
            created_at: timestamp_column(row, 5)?,
            updated_at: timestamp_column(row, 6)?,
        },
        category,
    })
}

impl Database {
    /// Record a new expense
    pub fn create_expense(&self, new: &NewExpense) -> Result<Expense> {
        let amount = validate_amount(&new.amount)?;
        let conn = self.conn()?;
        ensure_category_exists(&conn, new.category_id.as_deref())?;

        let now = Utc::now();
        let expense = Expense {
            id: new_id(),
            amount,
            description: normalize_description(new.description.as_deref()),
            category_id: new.category_id.clone(),
            date: new.date,
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            r#"
            INSERT INTO expenses (id, amount, description, category_id, date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                expense.id,
                expense.amount,
                expense.description,
                expense.category_id,
                format_timestamp(&expense.date),
                format_timestamp(&expense.created_at),
                format_timestamp(&expense.updated_at),
            ],
        )?;

        Ok(expense)
    }

    /// Get an expense with its category
    pub fn get_expense(&self, id: &str) -> Result<Option<ExpenseWithCategory>> {
        let conn = self.conn()?;
        get_expense_with_conn(&conn, id)
    }

    /// List expenses, newest first
    pub fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<ExpenseWithCategory>> {
        let conn = self.conn()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(category_id) = &filter.category_id {
            conditions.push("e.category_id = ?");
            values.push(Box::new(category_id.clone()));
        }
        if let Some(from) = filter.from {
            conditions.push("e.date >= ?");
            values.push(Box::new(format_timestamp(&day_start_utc(
                from,
                filter.utc_offset,
            ))));
        }
        // Inclusive: everything before the start of the following day
        if let Some(next_day) = filter.to.and_then(|to| to.checked_add_days(Days::new(1))) {
            conditions.push("e.date < ?");
            values.push(Box::new(format_timestamp(&day_start_utc(
                next_day,
                filter.utc_offset,
            ))));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT {}
            FROM expenses e
            LEFT JOIN categories c ON c.id = e.category_id
            {}
            ORDER BY e.date DESC, e.created_at DESC
            LIMIT ? OFFSET ?
            "#,
            EXPENSE_COLUMNS, where_clause
        );

        values.push(Box::new(filter.limit));
        values.push(Box::new(filter.offset));
        let param_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(param_refs.as_slice(), row_to_expense_with_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Count all stored expenses
    pub fn count_expenses(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Apply a partial update and return the updated expense
    pub fn update_expense(&self, id: &str, update: &ExpenseUpdate) -> Result<Expense> {
        let conn = self.conn()?;

        let mut expense = get_expense_with_conn(&conn, id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))?
            .expense;

        if let Some(amount) = &update.amount {
            expense.amount = validate_amount(amount)?;
        }
        if let Some(description) = &update.description {
            expense.description = normalize_description(description.as_deref());
        }
        if let Some(category_id) = &update.category_id {
            ensure_category_exists(&conn, category_id.as_deref())?;
            expense.category_id = category_id.clone();
        }
        if let Some(date) = update.date {
            expense.date = date;
        }
        expense.updated_at = Utc::now();

        conn.execute(
            r#"
            UPDATE expenses
            SET amount = ?, description = ?, category_id = ?, date = ?, updated_at = ?
            WHERE id = ?
            "#,
            params![
                expense.amount,
                expense.description,
                expense.category_id,
                format_timestamp(&expense.date),
                format_timestamp(&expense.updated_at),
                id,
            ],
        )?;

        Ok(expense)
    }

    /// Delete an expense
    pub fn delete_expense(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM expenses WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Expense {}", id)));
        }
        Ok(())
    }
}

fn get_expense_with_conn(conn: &DbConn, id: &str) -> Result<Option<ExpenseWithCategory>> {
    let sql = format!(
        r#"
        SELECT {}
        FROM expenses e
        LEFT JOIN categories c ON c.id = e.category_id
        WHERE e.id = ?
        "#,
        EXPENSE_COLUMNS
    );

    let expense = conn
        .query_row(&sql, params![id], row_to_expense_with_category)
        .optional()?;
    Ok(expense)
}
