use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::{Identity, Role};
use crate::error::ApiError;

/// The gate decision, kept pure: allow iff an identity is present and its
/// role is in the required set.
fn allowed(required: &[Role], role: Role) -> bool {
    required.contains(&role)
}

async fn gate(required: &'static [Role], request: Request, next: Next) -> Result<Response, ApiError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !allowed(required, identity.role()) {
        tracing::warn!(
            "Role gate rejected {} ({}): requires one of {:?}",
            identity.id(),
            identity.role(),
            required
        );
        return Err(ApiError::forbidden("Insufficient role for this operation"));
    }

    Ok(next.run(request).await)
}

// The route-facing gates are pre-bound parameter sets over the same decision.

pub async fn require_student(request: Request, next: Next) -> Result<Response, ApiError> {
    gate(&[Role::Student], request, next).await
}

pub async fn require_faculty(request: Request, next: Next) -> Result<Response, ApiError> {
    gate(&[Role::Faculty], request, next).await
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    gate(&[Role::Admin], request, next).await
}

/// Staff tier spanning both faculty and admins.
pub async fn require_faculty_or_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    gate(&[Role::Faculty, Role::Admin], request, next).await
}
