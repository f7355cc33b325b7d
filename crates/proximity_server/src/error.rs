//! Server error types with HTTP status code mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use proximity_core::ProximityError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("User id header is missing")]
    MissingUserId,

    /// Required form/query parameter absent or blank ("Latitude", "Longitude")
    #[error("{0} param is missing")]
    MissingParam(&'static str),

    /// Body declared as JSON but could not be decoded
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    Proximity(#[from] ProximityError),

    /// Blocking task panicked or was cancelled
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::MissingUserId | ServerError::MissingParam(_) | ServerError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Proximity(ProximityError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::Proximity(ProximityError::NotFound(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Proximity(ProximityError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use proximity_core::StoreError;

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        assert_eq!(ServerError::MissingUserId.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServerError::MissingParam("Latitude").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServerError::InvalidBody("eof".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::from(ProximityError::not_found("gone")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServerError::from(ProximityError::from(StoreError::Unavailable("down".into()))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_match_the_public_contract() {
        assert_eq!(ServerError::MissingUserId.to_string(), "User id header is missing");
        assert_eq!(ServerError::MissingParam("Longitude").to_string(), "Longitude param is missing");
        assert_eq!(ServerError::from(ProximityError::not_found("nope")).to_string(), "nope");
    }
}
