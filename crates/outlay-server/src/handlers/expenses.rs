//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::Deserialize;

use crate::{get_user_email, read_json, AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use outlay_core::models::{Expense, ExpenseFilter, ExpenseUpdate, ExpenseWithCategory, NewExpense};

/// Query parameters for listing expenses
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    pub category_id: Option<String>,
    /// Start date (YYYY-MM-DD, inclusive)
    pub from: Option<String>,
    /// End date (YYYY-MM-DD, inclusive)
    pub to: Option<String>,
    /// Minutes east of UTC for reading `from`/`to` (defaults to UTC days)
    pub tz_offset_minutes: Option<i32>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

fn parse_date_param(value: Option<&str>, name: &str) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| {
            AppError::bad_request(&format!("Invalid {} date format (use YYYY-MM-DD)", name))
        })
}

fn parse_offset_param(minutes: Option<i32>) -> Result<FixedOffset, AppError> {
    match minutes {
        None => Ok(Utc.fix()),
        Some(m) => m
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::bad_request("Invalid tz_offset_minutes (must be within 24h)")
            }),
    }
}

/// GET /api/expenses - List expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListExpensesQuery>,
    request: Request,
) -> Result<Json<Vec<ExpenseWithCategory>>, AppError> {
    let user_email = get_user_email(request.headers());

    let filter = ExpenseFilter {
        category_id: params.category_id.clone(),
        from: parse_date_param(params.from.as_deref(), "from")?,
        to: parse_date_param(params.to.as_deref(), "to")?,
        utc_offset: parse_offset_param(params.tz_offset_minutes)?,
        limit: params.limit.clamp(1, MAX_PAGE_LIMIT),
        offset: params.offset.max(0),
    };

    let expenses = state.db.list_expenses(&filter)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("expense"),
        None,
        Some(&format!(
            "category={:?}, from={:?}, to={:?}, limit={}, offset={}, count={}",
            filter.category_id,
            filter.from,
            filter.to,
            filter.limit,
            filter.offset,
            expenses.len()
        )),
    )?;

    Ok(Json(expenses))
}

/// GET /api/expenses/:id - Get an expense with its category
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<ExpenseWithCategory>, AppError> {
    let user_email = get_user_email(request.headers());

    let expense = state
        .db
        .get_expense(&id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    state
        .db
        .log_audit(&user_email, "view", Some("expense"), Some(&id), None)?;

    Ok(Json(expense))
}

/// POST /api/expenses - Record an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: NewExpense = read_json(request).await?;

    let expense = state.db.create_expense(&req)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("expense"),
        Some(&expense.id),
        Some(&format!(
            "amount={}, category={:?}",
            expense.amount, expense.category_id
        )),
    )?;

    Ok(Json(expense))
}

/// PATCH /api/expenses/:id - Update an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: ExpenseUpdate = read_json(request).await?;

    let expense = state.db.update_expense(&id, &req)?;

    state
        .db
        .log_audit(&user_email, "update", Some("expense"), Some(&id), None)?;

    Ok(Json(expense))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    state.db.delete_expense(&id)?;

    state
        .db
        .log_audit(&user_email, "delete", Some("expense"), Some(&id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
