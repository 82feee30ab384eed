//! Analytics handlers
//!
//! Each request reads a fresh snapshot of every expense and recomputes.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::{get_user_email, AppError, AppState};
use outlay_core::models::{
    BreakdownOptions, CategoryBreakdownEntry, GrandTotalBasis, SummaryResult,
};

/// Query parameters for the summary
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Reference instant (RFC 3339). Its UTC offset defines the calendar.
    pub at: Option<String>,
}

/// Summary along with the instant it was anchored at
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub at: String,
    #[serde(flatten)]
    pub summary: SummaryResult,
}

/// GET /api/analytics/summary - Spending totals and period-over-period change
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryQuery>,
    request: Request,
) -> Result<Json<SummaryResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    let reference: DateTime<FixedOffset> = match params.at.as_deref() {
        Some(at) => DateTime::parse_from_rfc3339(at)
            .map_err(|_| AppError::bad_request("Invalid at timestamp (use RFC 3339)"))?,
        None => Local::now().fixed_offset(),
    };

    let summary = state.db.expense_summary(&reference)?;
    let at = reference.to_rfc3339_opts(SecondsFormat::Secs, false);

    state.db.log_audit(
        &user_email,
        "report",
        Some("summary"),
        None,
        Some(&format!("at={}", at)),
    )?;

    Ok(Json(SummaryResponse { at, summary }))
}

/// Query parameters for the category breakdown
#[derive(Debug, Deserialize)]
pub struct BreakdownQuery {
    /// Grand total basis: "all" (default) or "categorized"
    pub basis: Option<String>,
}

/// Category breakdown along with the basis used for percentages
#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    pub basis: GrandTotalBasis,
    pub categories: Vec<CategoryBreakdownEntry>,
}

/// GET /api/analytics/categories - Spending per category, largest first
pub async fn get_category_breakdown(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BreakdownQuery>,
    request: Request,
) -> Result<Json<BreakdownResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    let basis = params
        .basis
        .as_deref()
        .map(str::parse::<GrandTotalBasis>)
        .transpose()
        .map_err(|e| AppError::bad_request(&e))?
        .unwrap_or_default();

    let categories = state
        .db
        .category_breakdown(BreakdownOptions { grand_total: basis })?;

    state.db.log_audit(
        &user_email,
        "report",
        Some("category_breakdown"),
        None,
        Some(&format!("basis={}, categories={}", basis, categories.len())),
    )?;

    Ok(Json(BreakdownResponse { basis, categories }))
}
