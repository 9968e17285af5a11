//! Account management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{core_error, AppError, AppState, CurrentUser, SuccessResponse};
use soldi_core::models::{Account, AccountStatus};

/// Request body for creating an account
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(default)]
    pub balance: f64,
}

/// Request body for updating an account
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: String,
    pub balance: f64,
}

/// Query parameters for listing accounts
#[derive(Debug, Deserialize, Default)]
pub struct ListAccountsQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// GET /api/accounts - List the user's accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListAccountsQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = state.db.list_accounts(user.id, params.include_archived)?;

    // Audit log - read access
    state.db.log_audit(
        &user.email,
        "list",
        Some("account"),
        None,
        Some(&format!("count={}", accounts.len())),
    )?;

    Ok(Json(accounts))
}

/// POST /api/accounts - Create a new account
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<Json<Account>, AppError> {
    if !req.balance.is_finite() {
        return Err(AppError::bad_request("Starting balance must be a number"));
    }

    let account = state
        .db
        .create_account(user.id, &req.name, req.balance)
        .map_err(core_error)?;

    state.db.log_audit(
        &user.email,
        "create",
        Some("account"),
        Some(account.id),
        Some(&format!("name={}, balance={}", account.name, account.balance)),
    )?;

    Ok(Json(account))
}

/// GET /api/accounts/:id - Get a single account
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    let account = state
        .db
        .get_account(user.id, id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", id)))?;

    state
        .db
        .log_audit(&user.email, "get", Some("account"), Some(id), None)?;

    Ok(Json(account))
}

/// PUT /api/accounts/:id - Update an account's name and balance
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<Json<Account>, AppError> {
    state
        .db
        .update_account(user.id, id, &req.name, req.balance)
        .map_err(core_error)?;

    state.db.log_audit(
        &user.email,
        "update",
        Some("account"),
        Some(id),
        Some(&format!("name={} balance={}", req.name, req.balance)),
    )?;

    let account = state
        .db
        .get_account(user.id, id)?
        .ok_or_else(|| AppError::internal("Account not found after update"))?;

    Ok(Json(account))
}

/// POST /api/accounts/:id/archive - Hide an account without deleting its history
pub async fn archive_account(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    state
        .db
        .set_account_status(user.id, id, AccountStatus::Archived)
        .map_err(core_error)?;

    state
        .db
        .log_audit(&user.email, "archive", Some("account"), Some(id), None)?;

    let account = state
        .db
        .get_account(user.id, id)?
        .ok_or_else(|| AppError::internal("Account not found after update"))?;

    Ok(Json(account))
}

/// POST /api/accounts/:id/unarchive - Restore an archived account
pub async fn unarchive_account(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    state
        .db
        .set_account_status(user.id, id, AccountStatus::Active)
        .map_err(core_error)?;

    state
        .db
        .log_audit(&user.email, "unarchive", Some("account"), Some(id), None)?;

    let account = state
        .db
        .get_account(user.id, id)?
        .ok_or_else(|| AppError::internal("Account not found after update"))?;

    Ok(Json(account))
}

/// DELETE /api/accounts/:id - Delete an account and its transactions
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    let account = state
        .db
        .get_account(user.id, id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", id)))?;

    state.db.delete_account(user.id, id).map_err(core_error)?;

    state.db.log_audit(
        &user.email,
        "delete",
        Some("account"),
        Some(id),
        Some(&format!("name={}", account.name)),
    )?;

    Ok(Json(SuccessResponse { success: true }))
}
