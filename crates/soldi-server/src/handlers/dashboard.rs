//! Dashboard summary handler

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{AppError, AppState, CurrentUser};
use soldi_core::models::DashboardStats;

const UPCOMING_REMINDERS: usize = 5;

/// GET /api/dashboard - Summary statistics for the current user
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<DashboardStats>, AppError> {
    let total_balance = state.db.total_balance(user.id)?;
    let active_accounts = state.db.list_accounts(user.id, false)?.len() as i64;
    let total_transactions = state.db.count_transactions(user.id)?;
    let upcoming_reminders = state.db.upcoming_reminders(user.id, UPCOMING_REMINDERS)?;

    state
        .db
        .log_audit(&user.email, "get", Some("dashboard"), None, None)?;

    Ok(Json(DashboardStats {
        total_balance,
        active_accounts,
        total_transactions,
        upcoming_reminders,
    }))
}
