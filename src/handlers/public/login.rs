use std::collections::HashMap;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::auth::{generate_jwt, AdminRecord, Claims, Identity};
use crate::config;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::AdminCredential;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - local-credential login for administrators.
///
/// Students and faculty sign in against the hosted store's own auth and
/// present the resulting opaque token; this endpoint only serves the local
/// admin-credential table and issues a locally signed JWT.
pub async fn login_post(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut field_errors = HashMap::new();
    if payload.email.is_empty() {
        field_errors.insert("email".to_string(), "This field is required".to_string());
    }
    if payload.password.is_empty() {
        field_errors.insert("password".to_string(), "This field is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Missing required fields",
            Some(field_errors),
        ));
    }

    let credential: Option<AdminCredential> = state
        .store
        .from("admin_credentials")
        .eq("email", &payload.email)?
        .fetch_optional()
        .await?;

    let Some(credential) = credential else {
        tracing::warn!("Login rejected: no credential row for '{}'", payload.email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let digest = hex::encode(Sha256::digest(payload.password.as_bytes()));
    if digest != credential.password_sha256 {
        tracing::warn!("Login rejected: bad password for '{}'", payload.email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    // The credential row alone does not grant a role; the admins table does
    let admin: Option<AdminRecord> = state
        .store
        .from("admins")
        .eq("email", &payload.email)?
        .fetch_optional()
        .await?;

    let Some(admin) = admin else {
        tracing::warn!(
            "Login rejected: credential for '{}' has no admin role record",
            payload.email
        );
        return Err(ApiError::unauthorized("No role record for this account"));
    };

    let identity = Identity::Admin(admin);
    let token = generate_jwt(Claims::new(&identity))?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": token,
            "identity": identity,
            "expires_in": expires_in,
        }
    })))
}
