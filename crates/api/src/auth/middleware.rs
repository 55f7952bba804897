//! Bearer token middleware for protected routes

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::service::{AuthError, AuthService};
use crate::error::ApiError;

/// State handed to [`require_auth`]
#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<AuthService>,
}

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Reject requests without a valid `Authorization: Bearer <token>` header
///
/// A missing or malformed header is a bad request; a token that fails
/// verification is unauthorized.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    let user_id = state.auth.authorize(token).map_err(|e| match e {
        AuthError::Unauthorized => ApiError::InvalidToken,
        other => other.into(),
    })?;

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::BadRequest("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| ApiError::BadRequest("Invalid authorization header".to_string()))?;

    // Exactly `Bearer <token>`, one space, no further separators
    match value.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(*token),
        _ => Err(ApiError::BadRequest(
            "Invalid authorization header".to_string(),
        )),
    }
}
