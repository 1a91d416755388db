use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Domain error taxonomy surfaced at the HTTP boundary.
///
/// Every variant renders as `{"error": "<message>"}`. Internal failures are
/// logged where they happen and collapse to `Unavailable` so nothing leaks.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("Token has expired")]
    ExpiredSession,

    #[error("Access denied")]
    Forbidden,

    #[error("Service temporarily unavailable")]
    Unavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            // The original API reported uniqueness conflicts as 400, and
            // clients depend on that.
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated(_) | ApiError::ExpiredSession => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        error!(error = %e, "database error");
        ApiError::Unavailable
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = %e, "internal error");
        ApiError::Unavailable
    }
}

/// Name of the violated unique constraint, if `e` is a unique violation.
///
/// Uniqueness (email, roll number, one mark per student per day) is enforced
/// by the database, so the insert is the check: callers match on the
/// constraint name to produce the right conflict message.
pub fn unique_violation(e: &sqlx::Error) -> Option<&str> {
    e.as_database_error()
        .filter(|db| matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
        .and_then(|db| db.constraint())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let cases = [
            (
                ApiError::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Conflict("dup".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (
                ApiError::Unauthenticated("no".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::ExpiredSession, StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden, StatusCode::FORBIDDEN),
            (ApiError::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn body_is_error_object() {
        let resp = ApiError::NotFound("Student not found".into()).into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024)
            .await
            .expect("read body");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(value["error"], "Student not found");
    }
}
