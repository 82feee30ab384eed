//! Domain models for Outlay

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user-defined expense category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Display color as a hex string (e.g. "#4f46e5")
    pub color: String,
    /// Symbolic icon key understood by the client (e.g. "utensils")
    pub icon: String,
}

/// Fallback color for categories created without one
pub const DEFAULT_CATEGORY_COLOR: &str = "#6b7280";

/// Fallback icon for categories created without one
pub const DEFAULT_CATEGORY_ICON: &str = "tag";

/// Categories seeded by `outlay init`: (id, name, color, icon)
pub const DEFAULT_CATEGORIES: &[(&str, &str, &str, &str)] = &[
    ("food", "Food & Dining", "#f97316", "utensils"),
    ("transport", "Transport", "#0ea5e9", "car"),
    ("housing", "Housing", "#8b5cf6", "home"),
    ("utilities", "Utilities", "#eab308", "bolt"),
    ("shopping", "Shopping", "#ec4899", "shopping-bag"),
    ("entertainment", "Entertainment", "#22c55e", "film"),
    ("health", "Health", "#ef4444", "heart"),
    ("other", "Other", DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON),
];

/// Input for creating a category
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Partial update for a category; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Result of deleting a category
#[derive(Debug, Clone, Serialize)]
pub struct DeleteCategoryResult {
    pub deleted: bool,
    /// Expenses whose category reference was cleared
    pub expenses_uncategorized: i64,
}

/// A stored expense row
///
/// `amount` is kept as the exact text that was written so no precision is
/// lost between storage and aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub amount: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An expense together with its resolved category
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseWithCategory {
    #[serde(flatten)]
    pub expense: Expense,
    pub category: Option<Category>,
}

/// Input for recording an expense
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    /// Decimal amount as text, e.g. "12.50"
    pub amount: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub date: DateTime<Utc>,
}

/// Partial update for an expense
///
/// `description` and `category_id` use a nested option so that callers can
/// clear them (`Some(None)`) as well as leave them untouched (`None`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseUpdate {
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category_id: Option<Option<String>>,
    pub date: Option<DateTime<Utc>>,
}

/// Distinguish an explicit JSON `null` from a missing field
fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Filter for listing expenses
#[derive(Debug, Clone)]
pub struct ExpenseFilter {
    pub category_id: Option<String>,
    /// Inclusive lower bound on the expense date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the expense date
    pub to: Option<NaiveDate>,
    /// Calendar `from` and `to` are read in
    pub utc_offset: FixedOffset,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ExpenseFilter {
    fn default() -> Self {
        Self {
            category_id: None,
            from: None,
            to: None,
            utc_offset: Utc.fix(),
            limit: 100,
            offset: 0,
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One expense as seen by the analytics engine
///
/// Built by the repository from a full snapshot. `category` is `None` when
/// the expense has no category or its reference no longer resolves.
#[derive(Debug, Clone)]
pub struct ExpenseRecord {
    pub amount: String,
    pub date: DateTime<Utc>,
    pub category: Option<Category>,
}

/// Spending totals with period-over-period change
///
/// Change fields are percentages; `None` means the previous window was empty
/// while the current one was not, so no meaningful ratio exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub total: Decimal,
    pub monthly: Decimal,
    pub previous_month: Decimal,
    pub monthly_change: Option<f64>,
    pub weekly: Decimal,
    pub previous_week: Decimal,
    pub weekly_change: Option<f64>,
    pub last_30_days: Decimal,
    pub previous_30_days: Decimal,
    pub last_30_days_change: Option<f64>,
}

/// Share of spending attributed to one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdownEntry {
    pub category: Category,
    pub amount: Decimal,
    pub percentage: f64,
}

/// What the breakdown percentages are relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrandTotalBasis {
    /// Every parsable expense, including uncategorized ones
    #[default]
    AllRecords,
    /// Only expenses with a resolvable category
    CategorizedOnly,
}

impl GrandTotalBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllRecords => "all",
            Self::CategorizedOnly => "categorized",
        }
    }
}

impl std::str::FromStr for GrandTotalBasis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "all_records" => Ok(Self::AllRecords),
            "categorized" | "categorized_only" => Ok(Self::CategorizedOnly),
            _ => Err(format!("Unknown grand total basis: {}", s)),
        }
    }
}

impl std::fmt::Display for GrandTotalBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options for the category breakdown
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakdownOptions {
    pub grand_total: GrandTotalBasis,
}
