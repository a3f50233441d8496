use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, Identity};
use crate::error::ApiError;
use crate::state::AppState;

/// Identity slot injected by the optional-auth path. `None` means the caller
/// is anonymous; there is no partially-resolved state.
#[derive(Clone, Debug)]
pub struct MaybeIdentity(pub Option<Identity>);

/// Mandatory authentication middleware. Resolves the bearer credential and
/// injects the [`Identity`] into the request; any failure terminates the
/// request with the mapped status.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = authorization_header(&request);

    let identity = match state.authenticator.authenticate(header.as_deref()).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!("Request authentication failed: {}", err);
            return Err(err.into());
        }
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Optional authentication middleware for routes that also serve anonymous
/// callers. Runs the same resolution as [`require_auth`], then maps
/// `Result<Identity, AuthError>` to `Option<Identity>` - the swallow is this
/// one visible transformation, nothing else.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = authorization_header(&request);

    let identity = match state.authenticator.authenticate(header.as_deref()).await {
        Ok(identity) => Some(identity),
        // Remote failures still reach the log at error level, even though the
        // request proceeds anonymously
        Err(AuthError::ResolutionFailure(store_err)) => {
            tracing::error!("Identity resolution failed on optional path: {}", store_err);
            None
        }
        Err(err) => {
            tracing::debug!("Optional auth proceeding anonymously: {}", err);
            None
        }
    };

    request.extensions_mut().insert(MaybeIdentity(identity));
    next.run(request).await
}

fn authorization_header(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
