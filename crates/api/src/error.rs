//! API error types and handling

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use projects_shared::StoreError;
use serde_json::json;

use crate::auth::AuthError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Authentication errors
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Refresh token expired")]
    ExpiredRefreshToken,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,
    #[error("Resource already exists")]
    Conflict(String),

    // Internal errors
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidToken
            | ApiError::Unauthorized
            | ApiError::InvalidRefreshToken
            | ApiError::ExpiredRefreshToken => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            // Authentication
            ApiError::InvalidToken => ("INVALID_TOKEN", self.to_string()),
            ApiError::Unauthorized => ("UNAUTHORIZED", self.to_string()),
            ApiError::InvalidRefreshToken => ("INVALID_REFRESH_TOKEN", self.to_string()),
            ApiError::ExpiredRefreshToken => ("EXPIRED_REFRESH_TOKEN", self.to_string()),

            // Validation
            ApiError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg.clone()),

            // Resources
            ApiError::NotFound => ("NOT_FOUND", self.to_string()),
            ApiError::Conflict(msg) => ("CONFLICT", msg.clone()),

            // Internal details stay in the logs
            ApiError::Database(_) => ("DATABASE_ERROR", "Database error".to_string()),
            ApiError::Internal => ("INTERNAL_ERROR", self.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (self.status(), body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Conflict(_) => ApiError::Conflict("Resource already exists".to_string()),
            StoreError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ApiError::Database(msg)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => ApiError::Unauthorized,
            AuthError::InvalidRefreshToken => ApiError::InvalidRefreshToken,
            AuthError::ExpiredRefreshToken => ApiError::ExpiredRefreshToken,
            AuthError::Conflict(msg) => ApiError::Conflict(msg),
            // Already logged where it was raised
            AuthError::Internal(_) => ApiError::Internal,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    #[tokio::test]
    async fn envelope_carries_code_and_message() {
        let response = ApiError::Validation("title is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "title is required");
    }

    #[tokio::test]
    async fn database_details_are_not_exposed() {
        let response = ApiError::Database("relation \"users\" does not exist".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "Database error");
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        let cases = [
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidRefreshToken, StatusCode::UNAUTHORIZED),
            (AuthError::ExpiredRefreshToken, StatusCode::UNAUTHORIZED),
            (AuthError::Conflict("dup".to_string()), StatusCode::CONFLICT),
            (
                AuthError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(ApiError::from(StoreError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(StoreError::Conflict("users_email_key".to_string())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::Database("timeout".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
