//! HTTP mapping of application errors.

use crate::application::error::ApplicationError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Handler error.
#[derive(Debug)]
pub enum ApiError {
    /// A use case failed.
    Application(ApplicationError),
    /// The request could not be decoded.
    BadRequest(String),
}

impl ApiError {
    /// Status code for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Application(e) => match e {
                ApplicationError::QuoteNotFound(_)
                | ApplicationError::RateNotFound { .. }
                | ApplicationError::BookingNotFound(_)
                | ApplicationError::NotFound { .. } => StatusCode::NOT_FOUND,
                ApplicationError::LocationNotFound { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ApplicationError::Unauthenticated => StatusCode::UNAUTHORIZED,
                ApplicationError::Unauthorized(_) => StatusCode::FORBIDDEN,
                ApplicationError::PlanLimitReached { .. } => StatusCode::PAYMENT_REQUIRED,
                ApplicationError::RateFetchFailed(_) => StatusCode::BAD_GATEWAY,
                ApplicationError::InvalidState(_) | ApplicationError::Conflict(_) => StatusCode::CONFLICT,
                ApplicationError::Validation(_) | ApplicationError::Domain(_) => StatusCode::BAD_REQUEST,
                ApplicationError::Repository(_) | ApplicationError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            Self::BadRequest(message) => ErrorResponse {
                code: "bad_request".to_string(),
                message: message.clone(),
            },
            Self::Application(e) => ErrorResponse {
                code: e.code().to_string(),
                message: e.user_message(),
            },
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        Self::Application(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            if let Self::Application(e) = &self {
                tracing::error!(code = e.code(), error = %e, "request failed");
            }
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::PlanTier;

    #[test]
    fn statuses() {
        let cases = [
            (ApplicationError::QuoteNotFound("QT-1".into()), StatusCode::NOT_FOUND),
            (ApplicationError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ApplicationError::unauthorized("admin"), StatusCode::FORBIDDEN),
            (
                ApplicationError::PlanLimitReached { limit: 5, tier: PlanTier::Free },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (ApplicationError::Conflict("stale".into()), StatusCode::CONFLICT),
            (ApplicationError::validation("bad"), StatusCode::BAD_REQUEST),
            (ApplicationError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn body_uses_code_and_user_message() {
        let body = ApiError::from(ApplicationError::BookingNotFound("BK-1".into())).body();
        assert_eq!(body.code, "booking_not_found");
        assert!(!body.message.is_empty());
    }
}
