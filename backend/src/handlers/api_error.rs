use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diffrenzz_leads::{ErrorCode, FieldErrors, IntakeErrorBody};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("consent is required")]
    ConsentRequired(FieldErrors),
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("challenge verification failed")]
    ChallengeFailed,
    #[error("too many submissions")]
    RateLimited,
    #[error("lead destination unavailable")]
    Upstream,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Malformed(_) | ApiError::ChallengeFailed => StatusCode::BAD_REQUEST,
            ApiError::ConsentRequired(_) | ApiError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream => StatusCode::BAD_GATEWAY,
        }
    }

    fn body(self) -> IntakeErrorBody {
        match self {
            ApiError::Malformed(detail) => {
                IntakeErrorBody::new(ErrorCode::ValidationFailed, format!("Invalid request: {}", detail))
            }
            ApiError::ConsentRequired(errors) => IntakeErrorBody::new(
                ErrorCode::ConsentRequired,
                "Consent to data processing is required.",
            )
            .with_fields(errors.to_messages()),
            ApiError::Validation(errors) => IntakeErrorBody::new(
                ErrorCode::ValidationFailed,
                "Some fields need attention.",
            )
            .with_fields(errors.to_messages()),
            ApiError::ChallengeFailed => IntakeErrorBody::new(
                ErrorCode::ChallengeFailed,
                "reCAPTCHA verification failed. Please try again.",
            ),
            ApiError::RateLimited => IntakeErrorBody::new(
                ErrorCode::RateLimited,
                "Too many submissions. Please wait a minute and try again.",
            ),
            ApiError::Upstream => IntakeErrorBody::new(
                ErrorCode::UpstreamUnavailable,
                "We could not record your message right now. Please try again later.",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}
