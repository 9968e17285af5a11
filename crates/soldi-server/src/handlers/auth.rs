//! Registration, login, and session handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{core_error, AppError, AppState, CurrentUser, SuccessResponse};
use soldi_core::auth;
use soldi_core::models::User;

/// Request body for register and login
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Response carrying a fresh session token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register - Create a user and log them in
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::bad_request("A valid email address is required"));
    }

    let password_hash = auth::hash_password(&req.password).map_err(core_error)?;
    let user = state
        .db
        .create_user(&email, &password_hash)
        .map_err(core_error)?;

    // A fresh user starts with the default account set
    let seeded = state.db.seed_default_accounts(user.id)?;
    if !seeded.is_empty() {
        info!(user = %user.email, accounts = ?seeded, "Seeded default accounts");
    }

    let token = issue_session(&state, &user)?;
    state
        .db
        .log_audit(&user.email, "register", Some("user"), Some(user.id), None)?;

    Ok(Json(AuthResponse { token, user }))
}

/// POST /api/auth/login - Exchange credentials for a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();

    // One failure message for both unknown email and wrong password
    let invalid = || AppError::unauthorized("Invalid email or password");

    let user = state
        .db
        .get_user_by_email(&email)?
        .filter(|u| !u.password_hash.is_empty())
        .ok_or_else(invalid)?;

    let verified =
        auth::verify_password(&req.password, &user.password_hash).map_err(core_error)?;
    if !verified {
        state
            .db
            .log_audit(&email, "login_failed", Some("user"), Some(user.id), None)?;
        return Err(invalid());
    }

    let token = issue_session(&state, &user)?;
    state
        .db
        .log_audit(&user.email, "login", Some("user"), Some(user.id), None)?;

    Ok(Json(AuthResponse { token, user }))
}

/// POST /api/auth/logout - Invalidate the current session token
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError> {
    if let Some(token) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
    {
        state.db.delete_session(&auth::hash_token(token))?;
    }

    state
        .db
        .log_audit(&user.email, "logout", Some("user"), Some(user.id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/me - The authenticated user
pub async fn get_me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<User>, AppError> {
    Ok(Json(user))
}

fn issue_session(state: &AppState, user: &User) -> Result<String, AppError> {
    let token = auth::generate_token();
    let expires_at = chrono::Utc::now() + chrono::Duration::days(auth::SESSION_TTL_DAYS);
    state
        .db
        .create_session(user.id, &auth::hash_token(&token), expires_at)?;
    Ok(token)
}
