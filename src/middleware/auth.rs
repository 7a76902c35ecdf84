use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::server::AppState;

/// Basic authentication for signin: checks `username:password` and attaches the user.
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (username, password) = extract_basic_credentials(&headers)?;

    let user = state.users.authenticate(&username, &password).await.map_err(|e| {
        tracing::warn!("Basic authentication failed for '{}': {}", username, e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Bearer authentication: resolves the token to its user and attaches it.
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;

    let user = state.users.verify_token(&token).await.map_err(|e| match e {
        // Storage trouble while resolving a token still reads as a failed login
        AuthError::Database(db_err) => {
            tracing::error!("Database error resolving bearer token: {}", db_err);
            ApiError::unauthorized("Invalid Token")
        }
        other => ApiError::from(other),
    })?;

    tracing::debug!("Authenticated '{}' ({})", user.username, user.role);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn authorization_value<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AuthError::MalformedHeader("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("Invalid Authorization header format".to_string()))?;

    match auth_str.trim().split_once(' ') {
        Some((given, value)) if given.eq_ignore_ascii_case(scheme) && !value.trim().is_empty() => {
            Ok(value.trim())
        }
        _ => Err(AuthError::MalformedHeader(format!(
            "Authorization header must use {} format",
            scheme
        ))),
    }
}

/// Extract `(username, password)` from `Authorization: Basic <base64>`
fn extract_basic_credentials(headers: &HeaderMap) -> Result<(String, String), AuthError> {
    let encoded = authorization_value(headers, "Basic")?;

    let decoded = STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| AuthError::MalformedHeader("Invalid Basic credentials".to_string()))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AuthError::MalformedHeader("Invalid Basic credentials".to_string()))?;

    Ok((username.to_string(), password.to_string()))
}

/// Extract the token from `Authorization: Bearer <token>`; the scheme is case-insensitive
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    authorization_value(headers, "Bearer").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn parses_basic_credentials() {
        let encoded = STANDARD.encode("tester1:pass:word");
        let headers = headers_with(&format!("Basic {}", encoded));

        let (user, pass) = extract_basic_credentials(&headers).unwrap();
        assert_eq!(user, "tester1");
        assert_eq!(pass, "pass:word");
    }

    #[test]
    fn rejects_bad_basic_credentials() {
        assert!(extract_basic_credentials(&HeaderMap::new()).is_err());
        assert!(extract_basic_credentials(&headers_with("Basic !!!")).is_err());
        let no_colon = STANDARD.encode("tester1");
        assert!(extract_basic_credentials(&headers_with(&format!("Basic {}", no_colon))).is_err());
        assert!(extract_basic_credentials(&headers_with("Bearer abc")).is_err());
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer_token(&headers_with("bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_bearer_token(&headers_with("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_or_empty_bearer() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
        assert!(extract_bearer_token(&headers_with("Bearer")).is_err());
        assert!(extract_bearer_token(&headers_with("Bearer   ")).is_err());
        assert!(extract_bearer_token(&headers_with("Token abc")).is_err());
    }
}
