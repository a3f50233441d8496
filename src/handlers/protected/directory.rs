use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{FacultyRecord, StudentRecord};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::SortDirection;

#[derive(Debug, Deserialize)]
pub struct StudentListQuery {
    pub semester: Option<i32>,
    pub branch: Option<String>,
}

/// GET /api/students - student directory (faculty, admin)
pub async fn student_list(
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rows = state
        .store
        .from("students")
        .order("enrollment_number", SortDirection::Asc)?;
    if let Some(semester) = query.semester {
        rows = rows.eq("semester", semester)?;
    }
    if let Some(branch) = &query.branch {
        rows = rows.eq("branch", branch)?;
    }

    let students: Vec<StudentRecord> = rows.fetch().await?;
    Ok(Json(json!({ "success": true, "data": students })))
}

/// GET /api/faculty - faculty directory (admin)
pub async fn faculty_list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let faculty: Vec<FacultyRecord> = state
        .store
        .from("faculty")
        .order("email", SortDirection::Asc)?
        .fetch()
        .await?;

    Ok(Json(json!({ "success": true, "data": faculty })))
}

#[derive(Debug, Deserialize)]
pub struct CreateFaculty {
    pub email: String,
    pub name: String,
    pub department: Option<String>,
    pub designation: Option<String>,
}

/// POST /api/faculty - provision a faculty role record (admin)
pub async fn faculty_create(
    State(state): State<AppState>,
    Json(payload): Json<CreateFaculty>,
) -> Result<impl IntoResponse, ApiError> {
    let mut field_errors = HashMap::new();
    if payload.email.is_empty() || !payload.email.contains('@') {
        field_errors.insert("email".to_string(), "Valid email required".to_string());
    }
    if payload.name.is_empty() {
        field_errors.insert("name".to_string(), "This field is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid faculty record",
            Some(field_errors),
        ));
    }

    let existing: Option<FacultyRecord> = state
        .store
        .from("faculty")
        .eq("email", &payload.email)?
        .fetch_optional()
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict(format!(
            "Faculty '{}' already exists",
            payload.email
        )));
    }

    let row = json!({
        "email": payload.email,
        "name": payload.name,
        "department": payload.department,
        "designation": payload.designation,
    });

    let created: Vec<FacultyRecord> = state.store.from("faculty").insert(&row).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "success": true, "data": created.into_iter().next() })),
    ))
}

/// DELETE /api/faculty/:email - remove a faculty role record (admin)
pub async fn faculty_delete(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let existing: Option<FacultyRecord> = state
        .store
        .from("faculty")
        .eq("email", &email)?
        .fetch_optional()
        .await?;
    if existing.is_none() {
        return Err(ApiError::not_found("Faculty not found"));
    }

    state
        .store
        .from("faculty")
        .eq("email", &email)?
        .delete()
        .await?;

    Ok(Json(json!({ "success": true, "data": { "email": email } })))
}
