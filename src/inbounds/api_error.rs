use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::models::UnknownNotificationType;
use crate::domain::services::activity::ActivityError;
use crate::outbounds::store::StoreError;

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Enums:                                                   |
/// |   - ApiError                                             |
/// | Type aliases:                                            |
/// |   - ApiResult                                            |
/// +----------------------------------------------------------+

/// Type alias for Result with ApiError
pub type ApiResult<T> = Result<T, ApiError>;

/// Represents errors that can occur in the API layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request carries no authenticated identity.
    #[error("Unauthorized")]
    Unauthorized,

    /// The request was malformed or invalid.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The request collides with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An internal server error occurred.
    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "code": status.as_u16()
            }
        }));

        (status, body).into_response()
    }
}

impl From<ActivityError> for ApiError {
    fn from(err: ActivityError) -> Self {
        match err {
            ActivityError::InvalidContent(_)
            | ActivityError::InvalidUsername(_)
            | ActivityError::SelfFollow => ApiError::BadRequest(err.to_string()),
            ActivityError::Store(store) => ApiError::from(store),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Conflict(what) => ApiError::Conflict(what),
            StoreError::Backend(msg) => ApiError::InternalError(anyhow::anyhow!("{}", msg)),
        }
    }
}

impl From<UnknownNotificationType> for ApiError {
    fn from(err: UnknownNotificationType) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let bad_request = ApiError::BadRequest("Invalid parameter".to_string());
        assert_eq!(format!("{}", bad_request), "Bad request: Invalid parameter");

        let internal_error = ApiError::InternalError(anyhow::anyhow!("Database error"));
        assert_eq!(
            format!("{}", internal_error),
            "Internal server error: Database error"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(ActivityError::SelfFollow).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::NotFound("tweet 1".into()))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::Conflict("username".into()))
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
    }
}
