use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::Subject;
use crate::store::SortDirection;

/// GET /api/subjects - list subjects, ordered by semester then code
pub async fn subject_list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let subjects: Vec<Subject> = state
        .store
        .from("subjects")
        .order("semester", SortDirection::Asc)?
        .order("code", SortDirection::Asc)?
        .fetch()
        .await?;

    Ok(Json(json!({ "success": true, "data": subjects })))
}

#[derive(Debug, Deserialize)]
pub struct CreateSubject {
    pub code: String,
    pub name: String,
    pub semester: i32,
    pub department: Option<String>,
}

/// POST /api/subjects - register a subject (admin)
pub async fn subject_create(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubject>,
) -> Result<impl IntoResponse, ApiError> {
    let mut field_errors = HashMap::new();
    if payload.code.is_empty() {
        field_errors.insert("code".to_string(), "This field is required".to_string());
    }
    if payload.name.is_empty() {
        field_errors.insert("name".to_string(), "This field is required".to_string());
    }
    if !(1..=12).contains(&payload.semester) {
        field_errors.insert(
            "semester".to_string(),
            "Must be between 1 and 12".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid subject",
            Some(field_errors),
        ));
    }

    let existing: Option<Subject> = state
        .store
        .from("subjects")
        .eq("code", &payload.code)?
        .fetch_optional()
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict(format!(
            "Subject '{}' already exists",
            payload.code
        )));
    }

    let row = json!({
        "code": payload.code,
        "name": payload.name,
        "semester": payload.semester,
        "department": payload.department,
    });

    let created: Vec<Subject> = state.store.from("subjects").insert(&row).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "success": true, "data": created.into_iter().next() })),
    ))
}

/// DELETE /api/subjects/:code - remove a subject (admin)
pub async fn subject_delete(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let existing: Option<Subject> = state
        .store
        .from("subjects")
        .eq("code", &code)?
        .fetch_optional()
        .await?;
    if existing.is_none() {
        return Err(ApiError::not_found("Subject not found"));
    }

    state
        .store
        .from("subjects")
        .eq("code", &code)?
        .delete()
        .await?;

    Ok(Json(json!({ "success": true, "data": { "code": code } })))
}
