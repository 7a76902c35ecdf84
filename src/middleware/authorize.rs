use axum::{
    extract::{Extension, Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::permissions::Permission;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;

/// Role check for the v2 surface; must run after bearer authentication.
pub async fn authorize_middleware(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let method = request.method().clone();
    let allowed = Permission::for_method(&method)
        .is_some_and(|permission| state.access.allows(user.role, permission));

    if !allowed {
        let granted: Vec<_> = state
            .access
            .permissions(user.role)
            .map(|permission| permission.as_str())
            .collect();
        tracing::warn!(
            "Access denied: '{}' ({}, granted [{}]) attempted {} {}",
            user.username,
            user.role,
            granted.join(", "),
            method,
            request.uri().path()
        );
        return Err(ApiError::access_denied());
    }

    Ok(next.run(request).await)
}
