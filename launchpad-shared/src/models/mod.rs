/// Database models for Launchpad
///
/// # Models
///
/// - `user`: User accounts backing the identity layer
/// - `application`: Accelerator applications, the portal's single record type
///
/// # Example
///
/// ```no_run
/// use launchpad_shared::models::user::{CreateUser, User};
/// use launchpad_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let founder = User::create(&pool, CreateUser {
///     email: "founder@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("Ada Founder".to_string()),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod application;
pub mod user;
