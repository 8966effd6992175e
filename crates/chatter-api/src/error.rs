use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use chatter_auth::policy::DenyReason;
use chatter_db::StoreError;

/// Request-scoped failures. Response bodies stay generic: nothing here
/// reveals which check failed beyond the status code itself.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("username already taken")]
    DuplicateUsername,

    /// Bad credentials. One message for unknown usernames and wrong
    /// passwords alike.
    #[error("login failed")]
    AuthenticationFailed,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("forbidden")]
    Forbidden,

    /// Moderation aimed at the root account: answered as a no-op.
    #[error("protected account")]
    ProtectedAccount,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => ApiError::DuplicateUsername,
            other => ApiError::Internal(other.into()),
        }
    }
}

impl From<DenyReason> for ApiError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NotAuthenticated => ApiError::NotAuthenticated,
            DenyReason::Banned | DenyReason::Forbidden => ApiError::Forbidden,
            DenyReason::ProtectedAccount => ApiError::ProtectedAccount,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::DuplicateUsername => StatusCode::CONFLICT,
            ApiError::AuthenticationFailed | ApiError::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::ProtectedAccount => StatusCode::NO_CONTENT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(err) => {
                error!("request failed: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }
        (status, self.to_string()).into_response()
    }
}
