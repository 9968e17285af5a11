//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{core_error, AppError, AppState, CurrentUser, SuccessResponse, MAX_PAGE_LIMIT};
use soldi_core::models::{NewTransaction, Posting, Transaction, TransactionKind};

/// Query parameters for transaction listing
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub account_id: Option<i64>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

/// Request body for recording a transaction.
/// `kind` selects which account fields apply: income and expense use
/// `account_id` (plus optional category), transfers use `from_account_id`
/// and `to_account_id`.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub kind: String,
    pub account_id: Option<i64>,
    pub from_account_id: Option<i64>,
    pub to_account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
}

impl CreateTransactionRequest {
    fn posting(&self) -> Result<Posting, AppError> {
        let kind: TransactionKind = self
            .kind
            .parse()
            .map_err(|e: String| AppError::bad_request(&e))?;

        match kind {
            TransactionKind::Income | TransactionKind::Expense => {
                let account_id = self
                    .account_id
                    .ok_or_else(|| AppError::bad_request("account_id is required"))?;
                Ok(match kind {
                    TransactionKind::Income => {
                        Posting::income(account_id, self.category_id, self.subcategory_id)
                    }
                    _ => Posting::expense(account_id, self.category_id, self.subcategory_id),
                })
            }
            TransactionKind::Transfer => {
                let from = self
                    .from_account_id
                    .ok_or_else(|| AppError::bad_request("from_account_id is required"))?;
                let to = self
                    .to_account_id
                    .ok_or_else(|| AppError::bad_request("to_account_id is required"))?;
                Posting::transfer(from, to).map_err(core_error)
            }
        }
    }
}

/// GET /api/transactions - List the user's transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let limit = params.limit.max(1).min(MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let transactions =
        state
            .db
            .list_transactions(user.id, params.account_id, Some(limit), Some(offset))?;

    state.db.log_audit(
        &user.email,
        "list",
        Some("transaction"),
        None,
        Some(&format!("count={}", transactions.len())),
    )?;

    Ok(Json(transactions))
}

/// POST /api/transactions - Record a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<Json<Transaction>, AppError> {
    let description = req.description.trim();
    if description.is_empty() {
        return Err(AppError::bad_request("Description is required"));
    }

    let posting = req.posting()?;
    let tx = NewTransaction::new(req.date, description.to_string(), req.amount, posting)
        .map_err(core_error)?;
    let stored = state
        .db
        .insert_transaction(user.id, &tx)
        .map_err(core_error)?;

    state.db.log_audit(
        &user.email,
        "create",
        Some("transaction"),
        Some(stored.id),
        Some(&format!("kind={}, amount={}", req.kind, stored.amount)),
    )?;

    Ok(Json(stored))
}

/// GET /api/transactions/:id - Get a single transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let tx = state
        .db
        .get_transaction(user.id, id)?
        .ok_or_else(|| AppError::not_found(&format!("Transaction {} not found", id)))?;

    state
        .db
        .log_audit(&user.email, "get", Some("transaction"), Some(id), None)?;

    Ok(Json(tx))
}

/// DELETE /api/transactions/:id - Delete a transaction, reversing its balance effect
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .db
        .delete_transaction(user.id, id)
        .map_err(core_error)?;

    state
        .db
        .log_audit(&user.email, "delete", Some("transaction"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
