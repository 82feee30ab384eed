//! Authentication-related handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Serialize;

use crate::{identify, AppError, AppState, AuthMethod};

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The authenticated user's email or identifier
    pub user: String,
    /// How the user was authenticated
    pub auth_method: String,
    /// Display name, when the email belongs to a registered user
    pub name: Option<String>,
    /// Whether the email belongs to a registered user
    pub registered: bool,
}

/// GET /api/me - Get the currently authenticated user
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MeResponse>, AppError> {
    let (user, method) = identify(request.headers());

    let registered = match method {
        AuthMethod::Header => state.db.get_user_by_email(&user)?,
        AuthMethod::ApiKey | AuthMethod::None => None,
    };

    state.db.log_audit(&user, "view", Some("me"), None, None)?;

    Ok(Json(MeResponse {
        user,
        auth_method: method.as_str().to_string(),
        name: registered.as_ref().and_then(|u| u.name.clone()),
        registered: registered.is_some(),
    }))
}
