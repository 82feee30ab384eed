//! Expense analytics
//!
//! Pure aggregation over a snapshot of [`ExpenseRecord`]s:
//! - [`compute_summary`] buckets spending into month, ISO week and rolling
//!   30-day windows and reports the change against the preceding window
//! - [`compute_category_breakdown`] sums spending per category with its share
//!   of the grand total
//!
//! Nothing here touches the database or the clock. Callers pass the
//! reference instant explicitly, and its time zone defines the calendar used
//! for day truncation.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    BreakdownOptions, Category, CategoryBreakdownEntry, ExpenseRecord, GrandTotalBasis,
    SummaryResult,
};

/// Parse a stored amount, returning `None` for anything that is not a decimal
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

/// Calendar day boundaries used by [`compute_summary`]
///
/// All bounds are inclusive start days; each "previous" window ends the day
/// before its current window starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryWindows {
    pub today: NaiveDate,
    pub start_of_month: NaiveDate,
    pub start_of_previous_month: NaiveDate,
    pub start_of_current_week: NaiveDate,
    pub start_of_previous_week: NaiveDate,
    pub start_of_last_30_days: NaiveDate,
    pub start_of_previous_30_days: NaiveDate,
}

impl SummaryWindows {
    /// Windows anchored at the calendar day of `reference` in its own time zone
    pub fn anchored_at<Tz: TimeZone>(reference: &DateTime<Tz>) -> Self {
        Self::for_day(reference.date_naive())
    }

    /// Windows anchored at `today`
    pub fn for_day(today: NaiveDate) -> Self {
        let start_of_month = first_of_month(today);
        let start_of_previous_month = first_of_month(start_of_month - Duration::days(1));

        // Weeks start on Monday
        let days_since_monday = i64::from(today.weekday().num_days_from_monday());
        let start_of_current_week = today - Duration::days(days_since_monday);
        let start_of_previous_week = start_of_current_week - Duration::days(7);

        let start_of_last_30_days = today - Duration::days(29);
        let start_of_previous_30_days = start_of_last_30_days - Duration::days(30);

        Self {
            today,
            start_of_month,
            start_of_previous_month,
            start_of_current_week,
            start_of_previous_week,
            start_of_last_30_days,
            start_of_previous_30_days,
        }
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.day0()))
}

/// Which side of a current/previous window pair a day falls on
enum Bucket {
    Current,
    Previous,
    Outside,
}

fn bucket(day: NaiveDate, current_start: NaiveDate, previous_start: NaiveDate) -> Bucket {
    if day >= current_start {
        Bucket::Current
    } else if day >= previous_start {
        Bucket::Previous
    } else {
        Bucket::Outside
    }
}

/// Running sums for one window family
#[derive(Default, Clone, Copy)]
struct WindowPair {
    current: Decimal,
    previous: Decimal,
}

impl WindowPair {
    /// The sums with `amount` added to the window `day` falls in, or `None` on overflow
    fn with(
        self,
        day: NaiveDate,
        current_start: NaiveDate,
        previous_start: NaiveDate,
        amount: Decimal,
    ) -> Option<Self> {
        let mut next = self;
        match bucket(day, current_start, previous_start) {
            Bucket::Current => next.current = self.current.checked_add(amount)?,
            Bucket::Previous => next.previous = self.previous.checked_add(amount)?,
            Bucket::Outside => {}
        }
        Some(next)
    }

    fn change(&self) -> Option<f64> {
        calculate_change(self.current, self.previous)
    }
}

/// Percentage change from `previous` to `current`
///
/// Returns `Some(0.0)` when both are zero and `None` when only `previous` is
/// zero, since growth from nothing has no finite percentage.
pub fn calculate_change(current: Decimal, previous: Decimal) -> Option<f64> {
    if previous.is_zero() {
        return if current.is_zero() { Some(0.0) } else { None };
    }

    current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|pct| pct.to_f64())
        .filter(|pct| pct.is_finite())
}

/// Compute spending totals for the windows anchored at `reference`
///
/// Every record with a parsable amount contributes to `total`. Within each
/// window family (month, week, 30 days) a record lands in at most one of the
/// current or previous window; the families themselves are independent.
///
/// A record whose amount would overflow any sum is left out of all of them.
pub fn compute_summary<Tz: TimeZone>(
    records: &[ExpenseRecord],
    reference: &DateTime<Tz>,
) -> SummaryResult {
    let windows = SummaryWindows::anchored_at(reference);
    let tz = reference.timezone();

    let mut total = Decimal::ZERO;
    let mut month = WindowPair::default();
    let mut week = WindowPair::default();
    let mut rolling = WindowPair::default();
    let mut skipped = 0usize;
    let mut overflowed = 0usize;

    for record in records {
        let Some(amount) = parse_amount(&record.amount) else {
            skipped += 1;
            continue;
        };

        let day = record.date.with_timezone(&tz).date_naive();

        let sums = total.checked_add(amount).and_then(|t| {
            Some((
                t,
                month.with(
                    day,
                    windows.start_of_month,
                    windows.start_of_previous_month,
                    amount,
                )?,
                week.with(
                    day,
                    windows.start_of_current_week,
                    windows.start_of_previous_week,
                    amount,
                )?,
                rolling.with(
                    day,
                    windows.start_of_last_30_days,
                    windows.start_of_previous_30_days,
                    amount,
                )?,
            ))
        });

        match sums {
            Some((t, m, w, r)) => {
                total = t;
                month = m;
                week = w;
                rolling = r;
            }
            None => overflowed += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped expenses with unparsable amounts in summary");
    }
    if overflowed > 0 {
        debug!(overflowed, "Skipped expenses that overflow the summary totals");
    }

    SummaryResult {
        total,
        monthly: month.current,
        previous_month: month.previous,
        monthly_change: month.change(),
        weekly: week.current,
        previous_week: week.previous,
        weekly_change: week.change(),
        last_30_days: rolling.current,
        previous_30_days: rolling.previous,
        last_30_days_change: rolling.change(),
    }
}

/// Sum spending per category, largest first
///
/// Uncategorized records never get an entry. Whether they count toward the
/// grand total (and so dilute the percentages) is set by `options`. A record
/// whose amount would overflow its category sum or the grand total is skipped.
pub fn compute_category_breakdown(
    records: &[ExpenseRecord],
    options: BreakdownOptions,
) -> Vec<CategoryBreakdownEntry> {
    let mut grand_total = Decimal::ZERO;
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(&Category, Decimal)> = Vec::new();
    let mut skipped = 0usize;
    let mut overflowed = 0usize;

    for record in records {
        let Some(amount) = parse_amount(&record.amount) else {
            skipped += 1;
            continue;
        };

        let counts_toward_total = record.category.is_some()
            || options.grand_total == GrandTotalBasis::AllRecords;
        let next_total = if counts_toward_total {
            grand_total.checked_add(amount)
        } else {
            Some(grand_total)
        };
        let Some(next_total) = next_total else {
            overflowed += 1;
            continue;
        };

        if let Some(category) = &record.category {
            match order.get(category.id.as_str()) {
                Some(&idx) => match sums[idx].1.checked_add(amount) {
                    Some(sum) => sums[idx].1 = sum,
                    None => {
                        overflowed += 1;
                        continue;
                    }
                },
                None => {
                    order.insert(category.id.as_str(), sums.len());
                    sums.push((category, amount));
                }
            }
        }
        grand_total = next_total;
    }

    if skipped > 0 {
        debug!(skipped, "Skipped expenses with unparsable amounts in breakdown");
    }
    if overflowed > 0 {
        debug!(overflowed, "Skipped expenses that overflow the breakdown totals");
    }

    let mut entries: Vec<CategoryBreakdownEntry> = sums
        .into_iter()
        .map(|(category, amount)| CategoryBreakdownEntry {
            category: category.clone(),
            amount,
            percentage: percentage_of(amount, grand_total),
        })
        .collect();

    // Stable: equal amounts keep first-encounter order
    entries.sort_by(|a, b| b.amount.cmp(&a.amount));
    entries
}

fn percentage_of(amount: Decimal, total: Decimal) -> f64 {
    if total <= Decimal::ZERO {
        return 0.0;
    }
    amount
        .checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|pct| pct.to_f64())
        .unwrap_or(0.0)
}
