/// Authentication utilities
///
/// This module provides the identity layer for the portal:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Caller identity types shared with the HTTP layer
///
/// # Example
///
/// ```no_run
/// use launchpad_shared::auth::password::{hash_password, verify_password};
/// use launchpad_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("founder_password")?;
/// assert!(verify_password("founder_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
