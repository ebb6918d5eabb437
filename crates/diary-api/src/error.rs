use axum::http::StatusCode;
use thiserror::Error;

use crate::ApiError;

/// Failure taxonomy of the diary workflow. Handlers convert these into HTTP
/// responses through the `ApiError` mapping below; the workflow itself only
/// ever raises and logs them.
#[derive(Debug, Error)]
pub enum DiaryError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("caller does not own this diary")]
    PermissionDenied,
    #[error("diary not found")]
    NotFound,
    #[error("like already exists")]
    AlreadyLiked,
    #[error("like does not exist")]
    NotLiked,
    #[error("author lookup failed: {0}")]
    AuthorLookup(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DiaryError> for ApiError {
    fn from(err: DiaryError) -> Self {
        let message = err.to_string();
        let (status, code) = match &err {
            DiaryError::BadRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            DiaryError::PermissionDenied => (StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
            DiaryError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            DiaryError::AlreadyLiked => (StatusCode::CONFLICT, "ALREADY_LIKED"),
            DiaryError::NotLiked => (StatusCode::CONFLICT, "NOT_LIKED"),
            DiaryError::AuthorLookup(_) => (StatusCode::BAD_GATEWAY, "USER_SERVICE_ERROR"),
            DiaryError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR"),
        };
        ApiError::new(status, code, message)
    }
}
