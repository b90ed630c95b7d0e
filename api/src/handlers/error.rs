//! Mapping of service errors onto HTTP responses

use actix_web::{
    error::{JsonPayloadError, QueryPayloadError, ResponseError},
    http::{header, StatusCode},
    HttpRequest, HttpResponse,
};
use std::fmt;
use validator::ValidationErrors;

use otp_core::{OtpError, OtpErrorKind};
use otp_shared::{error_codes, ApiResponse};

use crate::dto::OtpFailure;

/// Route family an OTP error came from; selects the failure payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpOperation {
    /// `send` and `resend`: `{issued: false, reason, retryAfterSeconds?}`
    Issue,
    /// `verify`: `{verified: false, reason}`
    Verify,
}

/// Error returned by route handlers
#[derive(Debug)]
pub enum ApiError {
    /// Outcome reported by the OTP service
    Otp {
        error: OtpError,
        operation: OtpOperation,
    },
    /// Request body or query failed to parse or validate
    Validation(String),
}

impl ApiError {
    /// Failure of an issue request
    pub fn issue(error: OtpError) -> Self {
        ApiError::Otp {
            error,
            operation: OtpOperation::Issue,
        }
    }

    /// Failure of a verify request
    pub fn verify(error: OtpError) -> Self {
        ApiError::Otp {
            error,
            operation: OtpOperation::Verify,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request data".to_string());
        ApiError::Validation(message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Otp { error, .. } => write!(f, "{}", error),
            ApiError::Validation(message) => write!(f, "Validation error: {}", message),
        }
    }
}

/// HTTP status for an OTP error kind
pub fn status_for(kind: OtpErrorKind) -> StatusCode {
    match kind {
        OtpErrorKind::InvalidPhone
        | OtpErrorKind::InvalidCodeFormat
        | OtpErrorKind::NotFoundOrExpired
        | OtpErrorKind::Mismatch => StatusCode::BAD_REQUEST,
        OtpErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        OtpErrorKind::DeliveryFailed => StatusCode::BAD_GATEWAY,
        OtpErrorKind::InternalError
        | OtpErrorKind::AlreadyInitialized
        | OtpErrorKind::NotInitialized
        | OtpErrorKind::InvalidConfiguration => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Otp { error, .. } => status_for(error.kind()),
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());

        match self {
            ApiError::Otp { error, operation } => {
                let retry_after_seconds = error.retry_after_seconds();
                if let Some(seconds) = retry_after_seconds {
                    builder.insert_header((header::RETRY_AFTER, seconds.to_string()));
                }
                if self.status_code().is_server_error() {
                    tracing::error!(error = %error, "Request failed");
                }

                let code = error.kind().code();
                let failure = match operation {
                    OtpOperation::Issue => OtpFailure::Issue {
                        issued: false,
                        reason: code.to_string(),
                        retry_after_seconds,
                    },
                    OtpOperation::Verify => OtpFailure::Verify {
                        verified: false,
                        reason: code.to_string(),
                    },
                };
                builder.json(ApiResponse::failure_with_data(
                    failure,
                    code,
                    error.user_message(),
                ))
            }
            ApiError::Validation(message) => builder.json(ApiResponse::<()>::error(
                error_codes::VALIDATION_ERROR,
                message.clone(),
            )),
        }
    }
}

/// Turn malformed JSON bodies into `VALIDATION_ERROR` responses
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %error, "Rejected JSON payload");
    ApiError::Validation(format!("Invalid request body: {}", error)).into()
}

/// Turn malformed query strings into `VALIDATION_ERROR` responses
pub fn query_error_handler(error: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %error, "Rejected query string");
    ApiError::Validation(format!("Invalid query string: {}", error)).into()
}

/// JSON 404 for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
