//! Authentication routes

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::StatusCode,
    Json,
};
use projects_shared::User;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::{
    auth::{
        clear_refresh_cookie, read_refresh_token, refresh_cookie, AuthError, AuthUser,
        Registration, TokenPair,
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn ok() -> Self {
        Self {
            message: "ok".to_string(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account
pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    let Json(mut req) = payload?;
    req.email = req.email.trim().to_lowercase();
    validate_registration(&req)?;

    let id = state.auth.register(req).await?;

    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

/// Exchange credentials for an access token and a refresh cookie
pub async fn sign_in(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<Json<AccessTokenResponse>> {
    let Json(req) = payload?;
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let pair = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(respond_with_pair(&state, &cookies, pair)))
}

/// Rotate the refresh cookie and issue a new access token
pub async fn refresh(
    State(state): State<AppState>,
    cookies: Cookies,
) -> ApiResult<Json<AccessTokenResponse>> {
    let cookie_config = &state.config.refresh_cookie;
    let token = read_refresh_token(&cookies, cookie_config)
        .ok_or_else(|| ApiError::BadRequest("Missing refresh token".to_string()))?;

    match state.auth.refresh_token_pair(&token).await {
        Ok(pair) => Ok(Json(respond_with_pair(&state, &cookies, pair))),
        Err(e @ (AuthError::InvalidRefreshToken | AuthError::ExpiredRefreshToken)) => {
            // The presented token no longer exists in the store
            clear_refresh_cookie(&cookies, cookie_config);
            Err(e.into())
        }
        // A store failure leaves the token in place for a retry
        Err(e) => Err(e.into()),
    }
}

/// Revoke the presented refresh token and clear the cookie
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    cookies: Cookies,
) -> ApiResult<Json<MessageResponse>> {
    let cookie_config = &state.config.refresh_cookie;

    if let Some(token) = read_refresh_token(&cookies, cookie_config) {
        state.auth.revoke(&token).await?;
    }
    clear_refresh_cookie(&cookies, cookie_config);

    tracing::info!(user_id = %auth_user.user_id, "User logged out");
    Ok(Json(MessageResponse::ok()))
}

/// Profile of the authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<User>> {
    let user = state.auth.profile(auth_user.user_id).await?;
    Ok(Json(user))
}

fn respond_with_pair(state: &AppState, cookies: &Cookies, pair: TokenPair) -> AccessTokenResponse {
    cookies.add(refresh_cookie(&state.config.refresh_cookie, pair.refresh_token));

    AccessTokenResponse {
        access_token: pair.access_token,
        token_type: "Bearer".to_string(),
        expires_in: pair.expires_in,
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_registration(req: &Registration) -> ApiResult<()> {
    if req.name.trim().chars().count() < 2 {
        return Err(ApiError::Validation(
            "Name must be at least 2 characters".to_string(),
        ));
    }
    if !is_valid_email(&req.email) {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }
    if req.username.trim().chars().count() < 3 {
        return Err(ApiError::Validation(
            "Username must be at least 3 characters".to_string(),
        ));
    }
    if req.password.chars().count() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    // Length checks per RFC 5321
    if email.is_empty() || email.len() > 254 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    if local.is_empty() || local.len() > 64 {
        return false;
    }
    // No leading/trailing/consecutive dots
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_alphanumeric() || ".+-_".contains(c))
    {
        return false;
    }

    if domain.starts_with('-') || domain.ends_with('-') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return false;
    }
    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }

    // Top-level label: at least 2 letters
    match domain.rsplit_once('.') {
        Some((_, tld)) => tld.len() >= 2 && tld.chars().all(|c| c.is_alphabetic()),
        None => false,
    }
}
