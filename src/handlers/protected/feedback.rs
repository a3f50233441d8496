use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::DailyFeedback;
use crate::store::{RowQuery, SortDirection};

#[derive(Debug, Deserialize)]
pub struct SubmitFeedback {
    pub date: NaiveDate,
    pub faculty_email: String,
    pub subject_code: String,
    pub rating: i32,
    pub comment: Option<String>,
}

/// POST /api/feedback - submit a daily lecture rating (student)
pub async fn feedback_submit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<SubmitFeedback>,
) -> Result<impl IntoResponse, ApiError> {
    let Identity::Student(student) = &identity else {
        return Err(ApiError::forbidden("Only students submit feedback"));
    };

    let mut field_errors = HashMap::new();
    if payload.faculty_email.is_empty() {
        field_errors.insert(
            "faculty_email".to_string(),
            "This field is required".to_string(),
        );
    }
    if payload.subject_code.is_empty() {
        field_errors.insert(
            "subject_code".to_string(),
            "This field is required".to_string(),
        );
    }
    if !(1..=5).contains(&payload.rating) {
        field_errors.insert("rating".to_string(), "Must be between 1 and 5".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid feedback",
            Some(field_errors),
        ));
    }

    let row = json!({
        "id": Uuid::new_v4(),
        "date": payload.date,
        "student_enrollment": student.enrollment_number,
        "faculty_email": payload.faculty_email,
        "subject_code": payload.subject_code,
        "rating": payload.rating,
        "comment": payload.comment,
        "created_at": Utc::now(),
    });

    let created: Vec<DailyFeedback> = state.store.from("daily_feedback").insert(&row).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "success": true, "data": created.into_iter().next() })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackListQuery {
    pub subject: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GET /api/feedback - list the caller's own submissions (student)
pub async fn feedback_list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<FeedbackListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Identity::Student(student) = &identity else {
        return Err(ApiError::forbidden("Only students list their feedback"));
    };

    let rows = state
        .store
        .from("daily_feedback")
        .eq("student_enrollment", &student.enrollment_number)?;
    let rows: Vec<DailyFeedback> = apply_window(rows, &query)?
        .order("date", SortDirection::Desc)?
        .fetch()
        .await?;

    Ok(Json(json!({ "success": true, "data": rows })))
}

/// GET /api/feedback/summary - rating summary for the caller's lectures
/// (faculty). The arithmetic is client-visible: averages, counts, and the
/// rating distribution as percentages.
pub async fn feedback_summary(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<FeedbackListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Identity::Faculty(faculty) = &identity else {
        return Err(ApiError::forbidden("Only faculty view their summary"));
    };

    let rows = state
        .store
        .from("daily_feedback")
        .eq("faculty_email", &faculty.email)?;
    let rows: Vec<DailyFeedback> = apply_window(rows, &query)?.fetch().await?;

    let summary = summarize(&rows);
    Ok(Json(json!({ "success": true, "data": summary })))
}

fn apply_window<'a>(
    mut query: RowQuery<'a>,
    window: &FeedbackListQuery,
) -> Result<RowQuery<'a>, ApiError> {
    if let Some(subject) = &window.subject {
        query = query.eq("subject_code", subject)?;
    }
    if let Some(from) = window.from {
        query = query.gte("date", from)?;
    }
    if let Some(to) = window.to {
        query = query.lte("date", to)?;
    }
    Ok(query)
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FeedbackSummary {
    pub responses: usize,
    pub average_rating: f64,
    /// Counts of ratings 1 through 5
    pub distribution: [usize; 5],
    /// Share of each rating as a percentage of all responses
    pub percentages: [f64; 5],
}

fn summarize(rows: &[DailyFeedback]) -> FeedbackSummary {
    let mut distribution = [0usize; 5];
    let mut total = 0i64;
    for row in rows {
        if (1..=5).contains(&row.rating) {
            distribution[(row.rating - 1) as usize] += 1;
            total += row.rating as i64;
        }
    }

    let responses: usize = distribution.iter().sum();
    let average_rating = if responses == 0 {
        0.0
    } else {
        round2(total as f64 / responses as f64)
    };

    let mut percentages = [0.0f64; 5];
    if responses > 0 {
        for (i, count) in distribution.iter().enumerate() {
            percentages[i] = round2(*count as f64 * 100.0 / responses as f64);
        }
    }

    FeedbackSummary {
        responses,
        average_rating,
        distribution,
        percentages,
    }
}

pub(super) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
