use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::auth::{Identity, Role};
use crate::error::ApiError;
use crate::middleware::MaybeIdentity;
use crate::state::AppState;
use crate::store::models::Notice;
use crate::store::SortDirection;

const AUDIENCES: [&str; 3] = ["all", "students", "faculty"];

/// GET /api/notices - list notices, newest first.
///
/// Anonymous callers see only the "all" audience; authenticated callers also
/// see the slice addressed to their role.
pub async fn notice_list(
    State(state): State<AppState>,
    Extension(MaybeIdentity(identity)): Extension<MaybeIdentity>,
) -> Result<impl IntoResponse, ApiError> {
    let audiences: &[&str] = match identity.as_ref().map(Identity::role) {
        Some(Role::Student) => &["all", "students"],
        Some(Role::Faculty) | Some(Role::Admin) => &["all", "faculty"],
        None => &["all"],
    };

    let notices: Vec<Notice> = state
        .store
        .from("notices")
        .in_list("audience", audiences)?
        .order("published_at", SortDirection::Desc)?
        .fetch()
        .await?;

    Ok(Json(json!({ "success": true, "data": notices })))
}

#[derive(Debug, Deserialize)]
pub struct CreateNotice {
    pub title: String,
    pub body: String,
    pub audience: String,
}

/// POST /api/notices - publish a notice (admin)
pub async fn notice_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateNotice>,
) -> Result<impl IntoResponse, ApiError> {
    let mut field_errors = HashMap::new();
    if payload.title.is_empty() {
        field_errors.insert("title".to_string(), "This field is required".to_string());
    }
    if payload.body.is_empty() {
        field_errors.insert("body".to_string(), "This field is required".to_string());
    }
    if !AUDIENCES.contains(&payload.audience.as_str()) {
        field_errors.insert(
            "audience".to_string(),
            "Must be one of: all, students, faculty".to_string(),
        );
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid notice",
            Some(field_errors),
        ));
    }

    let row = json!({
        "id": Uuid::new_v4(),
        "title": payload.title,
        "body": payload.body,
        "audience": payload.audience,
        "posted_by": identity.email(),
        "published_at": Utc::now(),
    });

    let created: Vec<Notice> = state.store.from("notices").insert(&row).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "success": true, "data": created.into_iter().next() })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotice {
    pub title: Option<String>,
    pub body: Option<String>,
    pub audience: Option<String>,
}

/// PUT /api/notices/:id - update a notice (admin)
pub async fn notice_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNotice>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(audience) = &payload.audience {
        if !AUDIENCES.contains(&audience.as_str()) {
            let mut field_errors = HashMap::new();
            field_errors.insert(
                "audience".to_string(),
                "Must be one of: all, students, faculty".to_string(),
            );
            return Err(ApiError::validation_error(
                "Invalid notice",
                Some(field_errors),
            ));
        }
    }

    let mut patch = Map::new();
    if let Some(title) = payload.title {
        patch.insert("title".to_string(), Value::String(title));
    }
    if let Some(body) = payload.body {
        patch.insert("body".to_string(), Value::String(body));
    }
    if let Some(audience) = payload.audience {
        patch.insert("audience".to_string(), Value::String(audience));
    }
    if patch.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    let existing: Option<Notice> = state
        .store
        .from("notices")
        .eq("id", id)?
        .fetch_optional()
        .await?;
    if existing.is_none() {
        return Err(ApiError::not_found("Notice not found"));
    }

    state
        .store
        .from("notices")
        .eq("id", id)?
        .update(&Value::Object(patch))
        .await?;

    Ok(Json(json!({ "success": true, "data": { "id": id } })))
}

/// DELETE /api/notices/:id - remove a notice (admin)
pub async fn notice_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let existing: Option<Notice> = state
        .store
        .from("notices")
        .eq("id", id)?
        .fetch_optional()
        .await?;
    if existing.is_none() {
        return Err(ApiError::not_found("Notice not found"));
    }

    state.store.from("notices").eq("id", id)?.delete().await?;

    Ok(Json(json!({ "success": true, "data": { "id": id } })))
}
