/// JWT token generation and validation
///
/// Tokens are signed with HS256 and carry the founder's user id as the
/// subject. The portal is single-tenant, so the subject is the whole
/// identity; there is no tenant or role claim.
///
/// # Token Types
///
/// - **Access Token**: short-lived (24h), used for API authentication
/// - **Refresh Token**: long-lived (30d), exchanged for new access tokens
///
/// # Example
///
/// ```
/// use launchpad_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
///
/// let claims = Claims::new(user_id, TokenType::Access);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token issuer claim
const ISSUER: &str = "launchpad";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived, 24 hours)
    Access,

    /// Refresh token (long-lived, 30 days)
    Refresh,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }
}

/// JWT claims structure
///
/// Standard claims plus the token type:
/// - `sub`: subject (user ID)
/// - `iss`: issuer (always "launchpad")
/// - `iat` / `exp` / `nbf`: issued-at, expiration, not-before timestamps
/// - `token_type`: access or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token type (custom claim)
    pub token_type: TokenType,
}

impl Claims {
    /// Creates new claims with the default expiration for the token type
    pub fn new(user_id: Uuid, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, token_type, token_type.default_expiration())
    }

    /// Creates claims with a custom expiration
    ///
    /// # Example
    ///
    /// ```
    /// use launchpad_shared::auth::jwt::{Claims, TokenType};
    /// use chrono::Duration;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::with_expiration(Uuid::new_v4(), TokenType::Access, Duration::hours(1));
    /// ```
    pub fn with_expiration(user_id: Uuid, token_type: TokenType, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 with the provided secret. The secret should be
/// at least 32 bytes and come from configuration, never source code.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies the signature, expiration, not-before time, and issuer.
///
/// # Errors
///
/// Returns an error if the signature is invalid, the token has expired, or
/// the issuer doesn't match.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and checks it's an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Access {
        return Err(JwtError::ValidationError(
            "Expected access token, got refresh token".to_string(),
        ));
    }

    Ok(claims)
}

/// Validates a token and checks it's a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::ValidationError(
            "Expected refresh token, got access token".to_string(),
        ));
    }

    Ok(claims)
}

/// Refreshes an access token using a refresh token
///
/// Takes a valid refresh token and issues a new access token for the same
/// user.
///
/// # Errors
///
/// Returns an error if the refresh token is invalid or expired
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<String, JwtError> {
    let refresh_claims = validate_refresh_token(refresh_token, secret)?;

    let access_claims = Claims::new(refresh_claims.sub, TokenType::Access);

    create_token(&access_claims, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_type_expiration() {
        assert_eq!(TokenType::Access.default_expiration(), Duration::hours(24));
        assert_eq!(TokenType::Refresh.default_expiration(), Duration::days(30));
    }

    #[test]
    fn test_create_and_validate_roundtrip() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenType::Access);

        let token = create_token(&claims, SECRET).expect("create should succeed");
        let validated = validate_token(&token, SECRET).expect("validate should succeed");

        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.iss, "launchpad");
        assert_eq!(validated.token_type, TokenType::Access);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, "a-completely-different-secret-key!!");
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims =
            Claims::with_expiration(Uuid::new_v4(), TokenType::Access, Duration::seconds(-120));
        let token = create_token(&claims, SECRET).unwrap();

        match validate_token(&token, SECRET) {
            Err(JwtError::Expired) => {}
            other => panic!("Expected Expired, got {:?}", other),
        }
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(validate_refresh_token(&token, SECRET).is_err());
        assert!(validate_access_token(&token, SECRET).is_ok());
    }

    #[test]
    fn test_refresh_access_token_issues_access() {
        let user_id = Uuid::new_v4();
        let refresh_claims = Claims::new(user_id, TokenType::Refresh);
        let refresh_token = create_token(&refresh_claims, SECRET).unwrap();

        let access_token =
            refresh_access_token(&refresh_token, SECRET).expect("refresh should succeed");
        let claims = validate_access_token(&access_token, SECRET).unwrap();

        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn test_refresh_with_access_token_fails() {
        let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        assert!(refresh_access_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_is_expired() {
        let live = Claims::new(Uuid::new_v4(), TokenType::Access);
        assert!(!live.is_expired());

        let dead =
            Claims::with_expiration(Uuid::new_v4(), TokenType::Access, Duration::seconds(-1));
        assert!(dead.is_expired());
    }
}
