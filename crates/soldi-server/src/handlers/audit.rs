//! Audit log handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, CurrentUser, MAX_PAGE_LIMIT};
use soldi_core::AuditEntry;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
}

fn default_audit_limit() -> i64 {
    100
}

/// GET /api/audit - Recent audit log entries, newest first
pub async fn list_audit_log(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(_user)): Extension<CurrentUser>,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let limit = params.limit.max(1).min(MAX_PAGE_LIMIT);
    let entries = state.db.list_audit_log(limit)?;
    Ok(Json(entries))
}
