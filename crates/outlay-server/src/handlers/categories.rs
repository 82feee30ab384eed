//! Category management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{get_user_email, read_json, AppError, AppState};
use outlay_core::models::{Category, CategoryUpdate, DeleteCategoryResult, NewCategory};

/// GET /api/categories - List all categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Category>>, AppError> {
    let user_email = get_user_email(request.headers());

    let categories = state.db.list_categories()?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("category"),
        None,
        Some(&format!("count={}", categories.len())),
    )?;

    Ok(Json(categories))
}

/// GET /api/categories/:id - Get a specific category
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let user_email = get_user_email(request.headers());

    let category = state
        .db
        .get_category(&id)?
        .ok_or_else(|| AppError::not_found("Category not found"))?;

    state
        .db
        .log_audit(&user_email, "view", Some("category"), Some(&id), None)?;

    Ok(Json(category))
}

/// POST /api/categories - Create a new category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: NewCategory = read_json(request).await?;

    let category = state.db.create_category(&req)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("category"),
        Some(&category.id),
        Some(&format!("name={}", category.name)),
    )?;

    Ok(Json(category))
}

/// PATCH /api/categories/:id - Update a category
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: CategoryUpdate = read_json(request).await?;

    let category = state.db.update_category(&id, &req)?;

    state
        .db
        .log_audit(&user_email, "update", Some("category"), Some(&id), None)?;

    Ok(Json(category))
}

/// Query parameters for deleting a category
#[derive(Debug, Deserialize)]
pub struct DeleteCategoryQuery {
    /// Delete even if expenses still use the category (they become uncategorized)
    #[serde(default)]
    pub force: bool,
}

/// DELETE /api/categories/:id - Delete a category
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteCategoryQuery>,
    request: Request,
) -> Result<Json<DeleteCategoryResult>, AppError> {
    let user_email = get_user_email(request.headers());

    let result = state.db.delete_category(&id, params.force)?;

    state.db.log_audit(
        &user_email,
        "delete",
        Some("category"),
        Some(&id),
        Some(&format!(
            "force={}, expenses_uncategorized={}",
            params.force, result.expenses_uncategorized
        )),
    )?;

    Ok(Json(result))
}
