/// Caller identity types shared with the HTTP layer
///
/// The portal service never reads ambient authentication state: every
/// operation takes the resolved caller identity as an explicit parameter.
/// This module defines that identity and the helpers the API's middleware
/// uses to resolve it from a request.
///
/// # Request Extensions
///
/// The API layer resolves credentials once per request and inserts a
/// [`CallerIdentity`] into the request extensions. Handlers extract it with
/// Axum's `Extension` extractor and hand the inner `Option<Uuid>` to the
/// portal.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use launchpad_shared::auth::middleware::CallerIdentity;
///
/// async fn handler(Extension(caller): Extension<CallerIdentity>) -> String {
///     match caller.user_id() {
///         Some(id) => format!("Hello, user {}!", id),
///         None => "Hello, anonymous!".to_string(),
///     }
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolved caller identity for one request
///
/// `None` means the request carried no usable credentials. Whether that is an
/// error is up to each portal operation, not the middleware.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CallerIdentity(Option<Uuid>);

impl CallerIdentity {
    /// An authenticated caller
    pub fn authenticated(user_id: Uuid) -> Self {
        Self(Some(user_id))
    }

    /// An anonymous caller
    pub fn anonymous() -> Self {
        Self(None)
    }

    /// The caller's user id, if authenticated
    pub fn user_id(&self) -> Option<Uuid> {
        self.0
    }
}

/// Error type for credential extraction
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

/// Extracts the bearer token from a request's Authorization header
///
/// # Errors
///
/// Returns `MissingCredentials` when the header is absent and
/// `InvalidFormat` when it is not a `Bearer` token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_caller_identity() {
        let user_id = Uuid::new_v4();

        let caller = CallerIdentity::authenticated(user_id);
        assert_eq!(caller.user_id(), Some(user_id));

        let anonymous = CallerIdentity::anonymous();
        assert_eq!(anonymous.user_id(), None);
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );

        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
