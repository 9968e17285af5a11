//! Category and subcategory handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{core_error, AppError, AppState, CurrentUser, SuccessResponse};
use soldi_core::models::{Category, Subcategory};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubcategoryRequest {
    pub name: String,
}

/// GET /api/categories - List categories with their subcategories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.db.list_categories(user.id)?;

    state.db.log_audit(
        &user.email,
        "list",
        Some("category"),
        None,
        Some(&format!("count={}", categories.len())),
    )?;

    Ok(Json(categories))
}

/// POST /api/categories - Create a category, optionally with subcategories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .db
        .create_category(user.id, &req.name, &req.subcategories)
        .map_err(core_error)?;

    state.db.log_audit(
        &user.email,
        "create",
        Some("category"),
        Some(category.id),
        Some(&format!("name={}", category.name)),
    )?;

    Ok(Json(category))
}

/// DELETE /api/categories/:id - Delete a category and its subcategories
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_category(user.id, id).map_err(core_error)?;

    state
        .db
        .log_audit(&user.email, "delete", Some("category"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/categories/:id/subcategories - Add a subcategory
pub async fn create_subcategory(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<CreateSubcategoryRequest>,
) -> Result<Json<Subcategory>, AppError> {
    let subcategory = state
        .db
        .add_subcategory(user.id, id, &req.name)
        .map_err(core_error)?;

    state.db.log_audit(
        &user.email,
        "create",
        Some("subcategory"),
        Some(subcategory.id),
        Some(&format!("category_id={}, name={}", id, subcategory.name)),
    )?;

    Ok(Json(subcategory))
}

/// DELETE /api/categories/:id/subcategories/:sub_id - Remove a subcategory
pub async fn delete_subcategory(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, sub_id)): Path<(i64, i64)>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .db
        .delete_subcategory(user.id, id, sub_id)
        .map_err(core_error)?;

    state.db.log_audit(
        &user.email,
        "delete",
        Some("subcategory"),
        Some(sub_id),
        Some(&format!("category_id={}", id)),
    )?;

    Ok(Json(SuccessResponse { success: true }))
}
