use axum::{response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::auth::Identity;

/// GET /api/auth/whoami - echo the resolved caller identity
pub async fn whoami(Extension(identity): Extension<Identity>) -> impl IntoResponse {
    Json(json!({ "success": true, "data": identity }))
}
