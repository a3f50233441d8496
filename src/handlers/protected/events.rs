use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::Event;
use crate::store::SortDirection;

/// GET /api/events - academic calendar, soonest first
pub async fn event_list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let events: Vec<Event> = state
        .store
        .from("events")
        .order("event_date", SortDirection::Asc)?
        .fetch()
        .await?;

    Ok(Json(json!({ "success": true, "data": events })))
}

#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
}

/// POST /api/events - add a calendar event (admin)
pub async fn event_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateEvent>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.title.is_empty() {
        let mut field_errors = HashMap::new();
        field_errors.insert("title".to_string(), "This field is required".to_string());
        return Err(ApiError::validation_error(
            "Invalid event",
            Some(field_errors),
        ));
    }

    let row = json!({
        "id": Uuid::new_v4(),
        "title": payload.title,
        "description": payload.description,
        "event_date": payload.event_date,
        "created_by": identity.email(),
    });

    let created: Vec<Event> = state.store.from("events").insert(&row).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "success": true, "data": created.into_iter().next() })),
    ))
}

/// DELETE /api/events/:id - remove a calendar event (admin)
pub async fn event_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let existing: Option<Event> = state
        .store
        .from("events")
        .eq("id", id)?
        .fetch_optional()
        .await?;
    if existing.is_none() {
        return Err(ApiError::not_found("Event not found"));
    }

    state.store.from("events").eq("id", id)?.delete().await?;

    Ok(Json(json!({ "success": true, "data": { "id": id } })))
}
