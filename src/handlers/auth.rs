use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::permissions::Role;
use crate::auth::{AuthError, AuthUser};
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// POST /api/v1/signup - create a user and return it with its token
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let username = payload.username.ok_or(AuthError::MissingField("username"))?;
    let password = payload.password.ok_or(AuthError::MissingField("password"))?;
    let role = match payload.role.as_deref() {
        Some(role) => role.parse::<Role>()?,
        None => Role::default(),
    };

    let user = state.users.create(&username, &password, role).await?;
    let token = user.token.clone();

    Ok((StatusCode::CREATED, Json(json!({ "user": user, "token": token }))))
}

/// POST /api/v1/signin - Basic credentials already checked by middleware
pub async fn signin(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    tracing::info!("User '{}' signed in", user.username);
    let token = user.token.clone();
    Json(json!({ "user": user, "token": token }))
}

/// GET /api/v1/users - every username
pub async fn users(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.users.list_usernames().await?))
}

/// GET /api/v1/secret - bearer token check
pub async fn secret(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    tracing::debug!("Secret area visited by '{}'", user.username);
    "Welcome to the secret area"
}
