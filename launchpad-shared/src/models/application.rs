/// Application model and database operations
///
/// An application is a single startup's submission record. Each user owns at
/// most one application, ever; the schema enforces this with a UNIQUE
/// constraint on `user_id`.
///
/// # Status
///
/// ```text
/// pending → reviewing
///         → accepted
///         → rejected
/// ```
///
/// Transitions are one-way and performed by the review team directly against
/// the store. No operation in this codebase moves an application out of
/// `pending`; the status only gates editability here.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE application_status AS ENUM ('pending', 'reviewing', 'accepted', 'rejected');
///
/// CREATE TABLE applications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     company_name VARCHAR(200) NOT NULL,
///     tagline VARCHAR(300) NOT NULL,
///     description TEXT NOT NULL,
///     agent_type VARCHAR(100) NOT NULL,
///     founder_name VARCHAR(200) NOT NULL,
///     founder_email VARCHAR(320) NOT NULL,
///     website VARCHAR(512),
///     stage VARCHAR(100) NOT NULL,
///     funding VARCHAR(200),
///     status application_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use launchpad_shared::models::application::{Application, ApplicationFields};
/// use launchpad_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let app = Application::create(&pool, Uuid::new_v4(), &ApplicationFields {
///     company_name: "Acme Agents".to_string(),
///     tagline: "Agents for everyone".to_string(),
///     description: "We build helpful agents.".to_string(),
///     agent_type: "tool".to_string(),
///     founder_name: "Ada Founder".to_string(),
///     founder_email: "ada@acme.dev".to_string(),
///     website: None,
///     stage: "idea".to_string(),
///     funding: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Review status of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted, not yet picked up by the review team
    Pending,

    /// Under review
    Reviewing,

    /// Accepted into the program
    Accepted,

    /// Rejected
    Rejected,
}

impl ApplicationStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// An application can only be edited before review starts
    pub fn is_editable(&self) -> bool {
        matches!(self, ApplicationStatus::Pending)
    }
}

/// Application model representing one startup's submission
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    /// Unique application ID
    pub id: Uuid,

    /// Owning user; immutable after creation
    pub user_id: Uuid,

    /// Company or project name
    pub company_name: String,

    /// One-line pitch
    pub tagline: String,

    /// Long-form description of the product
    pub description: String,

    /// Kind of agent being built (e.g., "tool", "assistant", "autonomous")
    pub agent_type: String,

    /// Founder's name
    pub founder_name: String,

    /// Founder's contact email
    pub founder_email: String,

    /// Company website, if any
    pub website: Option<String>,

    /// Company stage (e.g., "idea", "prototype", "revenue")
    pub stage: String,

    /// Funding raised so far, if disclosed
    pub funding: Option<String>,

    /// Current review status
    pub status: ApplicationStatus,

    /// When the application was submitted; immutable
    pub created_at: DateTime<Utc>,
}

/// The editable field set shared by submit and update
///
/// Everything a founder types into the form. `id`, `user_id`, `status`, and
/// `created_at` are never part of this set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationFields {
    pub company_name: String,
    pub tagline: String,
    pub description: String,
    pub agent_type: String,
    pub founder_name: String,
    pub founder_email: String,
    pub website: Option<String>,
    pub stage: String,
    pub funding: Option<String>,
}

/// Aggregate counts for the public stats widget
///
/// `rejected` is tracked in storage but deliberately absent here; the landing
/// page never shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total: i64,
    pub pending: i64,
    pub reviewing: i64,
    pub accepted: i64,
}

impl Application {
    /// Creates a new application in pending state
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails; a unique-constraint violation on
    /// `user_id` means the user already has an application.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        fields: &ApplicationFields,
    ) -> Result<Self, sqlx::Error> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (user_id, company_name, tagline, description,
                                      agent_type, founder_name, founder_email,
                                      website, stage, funding)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, user_id, company_name, tagline, description, agent_type,
                      founder_name, founder_email, website, stage, funding,
                      status, created_at
            "#,
        )
        .bind(user_id)
        .bind(&fields.company_name)
        .bind(&fields.tagline)
        .bind(&fields.description)
        .bind(&fields.agent_type)
        .bind(&fields.founder_name)
        .bind(&fields.founder_email)
        .bind(&fields.website)
        .bind(&fields.stage)
        .bind(&fields.funding)
        .fetch_one(pool)
        .await?;

        Ok(application)
    }

    /// Finds an application by ID scoped to its owner
    ///
    /// Returns `None` both when the id does not exist and when it belongs to
    /// someone else, so callers cannot probe for other users' applications.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, user_id, company_name, tagline, description, agent_type,
                   founder_name, founder_email, website, stage, funding,
                   status, created_at
            FROM applications
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(application)
    }

    /// Finds the most recently created application owned by a user
    pub async fn find_latest_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, user_id, company_name, tagline, description, agent_type,
                   founder_name, founder_email, website, stage, funding,
                   status, created_at
            FROM applications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(application)
    }

    /// Checks whether a user already owns an application
    pub async fn exists_for_user(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM applications WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Overwrites the editable fields of a pending application
    ///
    /// The `status = 'pending'` guard makes the write a no-op when the review
    /// team has already moved the application on; callers see that as `None`.
    /// `id`, `user_id`, `status`, and `created_at` are untouched.
    pub async fn update_fields(
        pool: &PgPool,
        id: Uuid,
        fields: &ApplicationFields,
    ) -> Result<Option<Self>, sqlx::Error> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET company_name = $2,
                tagline = $3,
                description = $4,
                agent_type = $5,
                founder_name = $6,
                founder_email = $7,
                website = $8,
                stage = $9,
                funding = $10
            WHERE id = $1 AND status = 'pending'
            RETURNING id, user_id, company_name, tagline, description, agent_type,
                      founder_name, founder_email, website, stage, funding,
                      status, created_at
            "#,
        )
        .bind(id)
        .bind(&fields.company_name)
        .bind(&fields.tagline)
        .bind(&fields.description)
        .bind(&fields.agent_type)
        .bind(&fields.founder_name)
        .bind(&fields.founder_email)
        .bind(&fields.website)
        .bind(&fields.stage)
        .bind(&fields.funding)
        .fetch_optional(pool)
        .await?;

        Ok(application)
    }

    /// Aggregate counts over all applications
    ///
    /// Single full-table scan; the dataset is a few hundred rows at most.
    /// `rejected` is counted in `total` but not broken out.
    pub async fn stats(pool: &PgPool) -> Result<ApplicationStats, sqlx::Error> {
        let (total, pending, reviewing, accepted): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'pending'),
                   COUNT(*) FILTER (WHERE status = 'reviewing'),
                   COUNT(*) FILTER (WHERE status = 'accepted')
            FROM applications
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(ApplicationStats {
            total,
            pending,
            reviewing,
            accepted,
        })
    }

    /// Counts applications in a given status
    pub async fn count_by_status(
        pool: &PgPool,
        status: ApplicationStatus,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM applications WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ApplicationStatus::Pending.as_str(), "pending");
        assert_eq!(ApplicationStatus::Reviewing.as_str(), "reviewing");
        assert_eq!(ApplicationStatus::Accepted.as_str(), "accepted");
        assert_eq!(ApplicationStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_only_pending_is_editable() {
        assert!(ApplicationStatus::Pending.is_editable());
        assert!(!ApplicationStatus::Reviewing.is_editable());
        assert!(!ApplicationStatus::Accepted.is_editable());
        assert!(!ApplicationStatus::Rejected.is_editable());
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        let json = serde_json::to_string(&ApplicationStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");

        let status: ApplicationStatus = serde_json::from_str("\"reviewing\"").unwrap();
        assert_eq!(status, ApplicationStatus::Reviewing);
    }

    #[test]
    fn test_stats_serializes_without_rejected() {
        let stats = ApplicationStats {
            total: 4,
            pending: 1,
            reviewing: 1,
            accepted: 1,
        };

        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value["total"], 4);
        assert!(value.get("rejected").is_none());
    }
}
