/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. All handlers return
/// `Result<T, ApiError>`, which converts into the appropriate status code and
/// a JSON body.
///
/// # Example
///
/// ```ignore
/// use launchpad_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     let data = fetch_data().await?;
///     Ok(Json(data))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use launchpad_shared::auth::jwt::JwtError;
use launchpad_shared::auth::middleware::AuthError;
use launchpad_shared::auth::password::PasswordError;
use launchpad_shared::portal::PortalError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - duplicate submission, closed-for-edits application,
    /// already-registered email
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "conflict")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert portal errors to API errors
///
/// Every portal failure is user-facing; the messages pass through verbatim.
impl From<PortalError> for ApiError {
    fn from(err: PortalError) -> Self {
        match err {
            PortalError::NotAuthenticated => ApiError::Unauthorized(err.to_string()),
            PortalError::AlreadySubmitted => ApiError::Conflict(err.to_string()),
            PortalError::NotFound => ApiError::NotFound(err.to_string()),
            PortalError::NotEditable => ApiError::Conflict(err.to_string()),
            PortalError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert credential-extraction errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Application not found".to_string());
        assert_eq!(err.to_string(), "Not found: Application not found");
    }

    #[test]
    fn test_portal_error_mapping() {
        let err: ApiError = PortalError::NotAuthenticated.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err: ApiError = PortalError::AlreadySubmitted.into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = PortalError::NotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = PortalError::NotEditable.into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_portal_messages_survive_mapping() {
        let err: ApiError = PortalError::AlreadySubmitted.into();
        assert_eq!(
            err.to_string(),
            "Conflict: You already have an application submitted"
        );

        let err: ApiError = PortalError::NotEditable.into();
        assert_eq!(
            err.to_string(),
            "Conflict: Cannot edit application that is being reviewed"
        );
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![ValidationErrorDetail {
            field: "founder_email".to_string(),
            message: "Invalid email format".to_string(),
        }];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
    }
}
