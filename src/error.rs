use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::flash::Flash;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,
    #[error("Contact not found")]
    ContactNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The flash shown to the user, `None` for infrastructure failures.
    pub fn flash(&self) -> Option<Flash> {
        match self {
            AppError::DuplicateUsername => Some(Flash::UsernameTaken),
            AppError::DuplicateEmail => Some(Flash::EmailTaken),
            AppError::InvalidCredentials => Some(Flash::InvalidCredentials),
            AppError::InvalidOrExpiredToken => Some(Flash::InvalidOrExpiredToken),
            AppError::ContactNotFound => Some(Flash::ContactNotFound),
            AppError::Internal(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Internal(e) => {
                error!(error = ?e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            other => (StatusCode::BAD_REQUEST, other.to_string()).into_response(),
        }
    }
}
