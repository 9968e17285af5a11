//! Recurring date reminder handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{core_error, AppError, AppState, CurrentUser, SuccessResponse};
use soldi_core::models::{NewReminder, Reminder, ReminderKind};

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub name: String,
    pub date: NaiveDate,
    pub kind: String,
}

/// GET /api/reminders - List reminders in calendar order (month-day)
pub async fn list_reminders(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let reminders = state.db.list_reminders(user.id)?;

    state.db.log_audit(
        &user.email,
        "list",
        Some("reminder"),
        None,
        Some(&format!("count={}", reminders.len())),
    )?;

    Ok(Json(reminders))
}

/// POST /api/reminders - Create a reminder
pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateReminderRequest>,
) -> Result<Json<Reminder>, AppError> {
    let kind: ReminderKind = req
        .kind
        .parse()
        .map_err(|e: String| AppError::bad_request(&e))?;

    let reminder = state
        .db
        .create_reminder(
            user.id,
            &NewReminder {
                name: req.name,
                date: req.date,
                kind,
            },
        )
        .map_err(core_error)?;

    state.db.log_audit(
        &user.email,
        "create",
        Some("reminder"),
        Some(reminder.id),
        Some(&format!("name={}, kind={}", reminder.name, reminder.kind)),
    )?;

    Ok(Json(reminder))
}

/// DELETE /api/reminders/:id - Delete a reminder
pub async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_reminder(user.id, id).map_err(core_error)?;

    state
        .db
        .log_audit(&user.email, "delete", Some("reminder"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
