use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure of a single request. Non-2xx responses carry a plain text body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, mistyped or malformed input.
    #[error("{0}")]
    Validation(String),

    /// No cat with the requested id. Holds the id as it appeared in the path.
    #[error("Cat {0} not found on the farm")]
    NotFound(String),

    /// The cat exists but is in the wrong state for the action.
    #[error("{0}")]
    ActionPrecondition(String),

    /// A statement ran but affected or returned no row.
    #[error("{0}")]
    PersistenceFailure(String),

    /// Database or other infrastructure fault.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::ActionPrecondition(_)
            | ApiError::PersistenceFailure(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Internal(err) => {
                // Don't expose driver errors to clients
                tracing::error!("Request failed: {:#}", err);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_kind_to_its_status() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::ActionPrecondition("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PersistenceFailure("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("disk on fire")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_cat() {
        assert_eq!(
            ApiError::NotFound("12".into()).to_string(),
            "Cat 12 not found on the farm"
        );
    }
}
