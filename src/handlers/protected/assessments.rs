use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::AssessmentPlan;
use crate::store::SortDirection;

const ASSESSMENT_TYPES: [&str; 5] = ["quiz", "assignment", "viva", "practical", "exam"];
const STATUSES: [&str; 3] = ["planned", "completed", "cancelled"];

/// GET /api/assessments - list the caller's own plans (faculty)
pub async fn assessment_list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let plans: Vec<AssessmentPlan> = state
        .store
        .from("assessment_plans")
        .eq("faculty_email", identity.email())?
        .order("planned_date", SortDirection::Asc)?
        .fetch()
        .await?;

    Ok(Json(json!({ "success": true, "data": plans })))
}

#[derive(Debug, Deserialize)]
pub struct CreateAssessment {
    pub subject_code: String,
    pub title: String,
    pub assessment_type: String,
    pub planned_date: NaiveDate,
    pub group_id: Option<Uuid>,
}

/// POST /api/assessments - plan an assessment (faculty)
pub async fn assessment_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateAssessment>,
) -> Result<impl IntoResponse, ApiError> {
    let mut field_errors = HashMap::new();
    if payload.subject_code.is_empty() {
        field_errors.insert(
            "subject_code".to_string(),
            "This field is required".to_string(),
        );
    }
    if payload.title.is_empty() {
        field_errors.insert("title".to_string(), "This field is required".to_string());
    }
    if !ASSESSMENT_TYPES.contains(&payload.assessment_type.as_str()) {
        field_errors.insert(
            "assessment_type".to_string(),
            "Must be one of: quiz, assignment, viva, practical, exam".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid assessment plan",
            Some(field_errors),
        ));
    }

    let row = json!({
        "id": Uuid::new_v4(),
        "faculty_email": identity.email(),
        "subject_code": payload.subject_code,
        "title": payload.title,
        "assessment_type": payload.assessment_type,
        "planned_date": payload.planned_date,
        "group_id": payload.group_id,
        "status": "planned",
    });

    let created: Vec<AssessmentPlan> = state.store.from("assessment_plans").insert(&row).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "success": true, "data": created.into_iter().next() })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssessment {
    pub title: Option<String>,
    pub assessment_type: Option<String>,
    pub planned_date: Option<NaiveDate>,
    pub group_id: Option<Uuid>,
    pub status: Option<String>,
}

/// PUT /api/assessments/:id - update an owned plan (faculty)
pub async fn assessment_update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssessment>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = fetch_owned_plan(&state, &identity, id).await?;

    let mut field_errors = HashMap::new();
    if let Some(assessment_type) = &payload.assessment_type {
        if !ASSESSMENT_TYPES.contains(&assessment_type.as_str()) {
            field_errors.insert(
                "assessment_type".to_string(),
                "Must be one of: quiz, assignment, viva, practical, exam".to_string(),
            );
        }
    }
    if let Some(status) = &payload.status {
        if !STATUSES.contains(&status.as_str()) {
            field_errors.insert(
                "status".to_string(),
                "Must be one of: planned, completed, cancelled".to_string(),
            );
        }
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid assessment plan",
            Some(field_errors),
        ));
    }

    let mut patch = Map::new();
    if let Some(title) = payload.title {
        patch.insert("title".to_string(), Value::String(title));
    }
    if let Some(assessment_type) = payload.assessment_type {
        patch.insert(
            "assessment_type".to_string(),
            Value::String(assessment_type),
        );
    }
    if let Some(planned_date) = payload.planned_date {
        patch.insert("planned_date".to_string(), json!(planned_date));
    }
    if let Some(group_id) = payload.group_id {
        patch.insert("group_id".to_string(), json!(group_id));
    }
    if let Some(status) = payload.status {
        patch.insert("status".to_string(), Value::String(status));
    }
    if patch.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    state
        .store
        .from("assessment_plans")
        .eq("id", plan.id)?
        .update(&Value::Object(patch))
        .await?;

    Ok(Json(json!({ "success": true, "data": { "id": plan.id } })))
}

/// DELETE /api/assessments/:id - delete an owned plan (faculty)
pub async fn assessment_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = fetch_owned_plan(&state, &identity, id).await?;

    state
        .store
        .from("assessment_plans")
        .eq("id", plan.id)?
        .delete()
        .await?;

    Ok(Json(json!({ "success": true, "data": { "id": plan.id } })))
}

async fn fetch_owned_plan(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
) -> Result<AssessmentPlan, ApiError> {
    let plan: Option<AssessmentPlan> = state
        .store
        .from("assessment_plans")
        .eq("id", id)?
        .fetch_optional()
        .await?;

    let Some(plan) = plan else {
        return Err(ApiError::not_found("Assessment plan not found"));
    };

    if plan.faculty_email != identity.email() {
        tracing::warn!(
            "Faculty '{}' attempted to modify plan {} owned by '{}'",
            identity.email(),
            plan.id,
            plan.faculty_email
        );
        return Err(ApiError::forbidden("Plan belongs to another faculty"));
    }

    Ok(plan)
}
