//! Bank statement import handlers

use std::io::Cursor;
use std::sync::Arc;

use axum::{extract::Multipart, extract::State, Extension, Json};
use serde::Serialize;
use tracing::info;

use crate::{core_error, AppError, AppState, CurrentUser, MAX_UPLOAD_SIZE};
use soldi_core::import::{self, ImportOutcome, StatementRow};

/// Response for the import endpoints
#[derive(Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
    pub account_name: String,
}

/// Response for the preview endpoint
#[derive(Serialize)]
pub struct PreviewResponse {
    pub total_rows: usize,
    pub preview: Vec<StatementRow>,
}

struct Upload {
    file_data: Vec<u8>,
    account_id: i64,
}

/// Extract the `file` and `account_id` fields from a multipart form,
/// enforcing the upload size limit.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut account_id: Option<i64> = None;
    let mut total_size: usize = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;
                total_size += bytes.len();

                if total_size > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                file_data = Some(bytes.to_vec());
            }
            "account_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read account_id"))?;
                account_id = Some(value.parse().map_err(|_| {
                    AppError::bad_request(&format!("Invalid account_id: {}", value))
                })?);
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let account_id = account_id.ok_or_else(|| AppError::bad_request("Missing account_id field"))?;

    Ok(Upload {
        file_data,
        account_id,
    })
}

fn commit(
    state: &AppState,
    user: &soldi_core::models::User,
    account_id: i64,
    rows: &[StatementRow],
    source: &str,
) -> Result<Json<ImportResponse>, AppError> {
    let account = state
        .db
        .get_account(user.id, account_id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", account_id)))?;

    let ImportOutcome {
        imported,
        skipped,
        failed,
    } = import::commit_rows(&state.db, user.id, account.id, rows);

    info!(
        account = %account.name,
        imported,
        skipped,
        failed,
        "Statement import complete"
    );

    state.db.log_audit(
        &user.email,
        "import",
        Some("account"),
        Some(account.id),
        Some(&format!(
            "source={}, imported={}, skipped={}, failed={}",
            source, imported, skipped, failed
        )),
    )?;

    Ok(Json(ImportResponse {
        imported,
        skipped,
        failed,
        account_name: account.name,
    }))
}

/// POST /api/import/statement - Import an xlsx bank statement
///
/// Expects multipart form with:
/// - file: xlsx statement export (required, max 10MB)
/// - account_id: Account to import into (required)
pub async fn import_statement(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let rows =
        import::parse_statement(Cursor::new(upload.file_data)).map_err(core_error)?;
    commit(&state, &user, upload.account_id, &rows, "xlsx")
}

/// POST /api/import/statement/preview - Parse a statement without committing
pub async fn preview_statement(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<PreviewResponse>, AppError> {
    let upload = read_upload(multipart).await?;

    // The account must exist even though nothing is written
    state
        .db
        .get_account(user.id, upload.account_id)?
        .ok_or_else(|| {
            AppError::not_found(&format!("Account {} not found", upload.account_id))
        })?;

    let rows =
        import::parse_statement(Cursor::new(upload.file_data)).map_err(core_error)?;

    Ok(Json(PreviewResponse {
        total_rows: rows.len(),
        preview: import::preview(&rows).to_vec(),
    }))
}

/// POST /api/import/csv - Import a generic CSV export
pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let rows = import::parse_csv(upload.file_data.as_slice()).map_err(core_error)?;
    commit(&state, &user, upload.account_id, &rows, "csv")
}
