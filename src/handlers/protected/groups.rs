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

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::Group;
use crate::store::SortDirection;

/// GET /api/groups - list the caller's own student groups (faculty)
pub async fn group_list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let groups: Vec<Group> = state
        .store
        .from("groups")
        .eq("faculty_email", identity.email())?
        .order("created_at", SortDirection::Desc)?
        .fetch()
        .await?;

    Ok(Json(json!({ "success": true, "data": groups })))
}

#[derive(Debug, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// POST /api/groups - create a student group owned by the caller (faculty)
pub async fn group_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateGroup>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.is_empty() {
        let mut field_errors = HashMap::new();
        field_errors.insert("name".to_string(), "This field is required".to_string());
        return Err(ApiError::validation_error(
            "Invalid group",
            Some(field_errors),
        ));
    }

    let row = json!({
        "id": Uuid::new_v4(),
        "name": payload.name,
        "faculty_email": identity.email(),
        "members": payload.members,
        "created_at": Utc::now(),
    });

    let created: Vec<Group> = state.store.from("groups").insert(&row).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "success": true, "data": created.into_iter().next() })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroup {
    pub name: Option<String>,
    pub members: Option<Vec<String>>,
}

/// PUT /api/groups/:id - rename or re-member an owned group (faculty)
pub async fn group_update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGroup>,
) -> Result<impl IntoResponse, ApiError> {
    let group = fetch_owned_group(&state, &identity, id).await?;

    let mut patch = Map::new();
    if let Some(name) = payload.name {
        if name.is_empty() {
            return Err(ApiError::bad_request("Group name cannot be empty"));
        }
        patch.insert("name".to_string(), Value::String(name));
    }
    if let Some(members) = payload.members {
        patch.insert("members".to_string(), json!(members));
    }
    if patch.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    state
        .store
        .from("groups")
        .eq("id", group.id)?
        .update(&Value::Object(patch))
        .await?;

    Ok(Json(json!({ "success": true, "data": { "id": group.id } })))
}

/// DELETE /api/groups/:id - delete an owned group (faculty)
pub async fn group_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let group = fetch_owned_group(&state, &identity, id).await?;

    state
        .store
        .from("groups")
        .eq("id", group.id)?
        .delete()
        .await?;

    Ok(Json(json!({ "success": true, "data": { "id": group.id } })))
}

/// Ownership check shared by the mutating group handlers. Rows belonging to
/// other faculty surface as Forbidden, not NotFound.
async fn fetch_owned_group(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
) -> Result<Group, ApiError> {
    let group: Option<Group> = state
        .store
        .from("groups")
        .eq("id", id)?
        .fetch_optional()
        .await?;

    let Some(group) = group else {
        return Err(ApiError::not_found("Group not found"));
    };

    if group.faculty_email != identity.email() {
        tracing::warn!(
            "Faculty '{}' attempted to modify group {} owned by '{}'",
            identity.email(),
            group.id,
            group.faculty_email
        );
        return Err(ApiError::forbidden("Group belongs to another faculty"));
    }

    Ok(group)
}
