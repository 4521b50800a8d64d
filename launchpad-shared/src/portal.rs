/// The application portal service
///
/// The portal is the only business-logic component of the system: four
/// operations over the applications collection. Every operation takes the
/// resolved caller identity explicitly; nothing here reads authentication
/// state from anywhere else.
///
/// # Operations
///
/// | Operation              | Auth      | Errors                                  |
/// |------------------------|-----------|-----------------------------------------|
/// | `get_user_application` | optional  | none (absence is a valid result)        |
/// | `get_stats`            | none      | none                                    |
/// | `submit`               | required  | `NotAuthenticated`, `AlreadySubmitted`  |
/// | `update_application`   | required  | `NotAuthenticated`, `NotFound`, `NotEditable` |
///
/// No operation deletes an application or changes its status; status moves
/// only under the review team's hands, directly in the store.
///
/// # Example
///
/// ```no_run
/// use launchpad_shared::events::ChangeFeed;
/// use launchpad_shared::models::application::ApplicationFields;
/// use launchpad_shared::portal::Portal;
/// use launchpad_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let portal = Portal::new(pool, ChangeFeed::default());
///
/// let caller = Some(Uuid::new_v4());
/// let id = portal.submit(caller, &ApplicationFields {
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
/// println!("submitted {}", id);
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::events::{ApplicationEvent, ChangeFeed};
use crate::models::application::{Application, ApplicationFields, ApplicationStats};

/// Unique constraint backing the one-application-per-user invariant
const USER_UNIQUE_CONSTRAINT: &str = "applications_user_id_key";

/// Portal operation error
///
/// All variants except `Database` are user-facing input or authorization
/// failures with no retry semantics. Messages are written to be shown to the
/// founder as-is.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Caller is not authenticated
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Caller already owns an application
    #[error("You already have an application submitted")]
    AlreadySubmitted,

    /// Application missing, or owned by someone else. The two cases are
    /// deliberately indistinguishable so non-owners cannot probe for ids.
    #[error("Application not found")]
    NotFound,

    /// Application has left pending and can no longer be edited
    #[error("Cannot edit application that is being reviewed")]
    NotEditable,

    /// Underlying store failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The application portal service
///
/// Cheap to clone; clones share the pool and the change feed.
#[derive(Debug, Clone)]
pub struct Portal {
    db: PgPool,
    feed: ChangeFeed,
}

impl Portal {
    /// Creates a portal over a pool and a change feed
    pub fn new(db: PgPool, feed: ChangeFeed) -> Self {
        Self { db, feed }
    }

    /// The portal's change feed, for subscribing
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Returns the caller's application, if any
    ///
    /// The most recently created application owned by the caller, or `None`
    /// when the caller is unauthenticated or has never submitted. There is no
    /// error path; absence is a valid result.
    pub async fn get_user_application(
        &self,
        caller: Option<Uuid>,
    ) -> Result<Option<Application>, PortalError> {
        let Some(user_id) = caller else {
            return Ok(None);
        };

        let application = Application::find_latest_by_user(&self.db, user_id).await?;
        Ok(application)
    }

    /// Aggregate counts over all applications
    ///
    /// Unauthenticated-safe and side-effect-free. `rejected` rows count
    /// toward `total` but are not broken out.
    pub async fn get_stats(&self) -> Result<ApplicationStats, PortalError> {
        let stats = Application::stats(&self.db).await?;
        Ok(stats)
    }

    /// Submits a new application for the caller
    ///
    /// Creates the application with `status = pending` and returns its id.
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` when the caller is anonymous
    /// - `AlreadySubmitted` when the caller already owns an application. The
    ///   existence check gives the friendly path; the UNIQUE constraint on
    ///   `user_id` catches the race where two submits pass the check together.
    pub async fn submit(
        &self,
        caller: Option<Uuid>,
        fields: &ApplicationFields,
    ) -> Result<Uuid, PortalError> {
        let user_id = caller.ok_or(PortalError::NotAuthenticated)?;

        if Application::exists_for_user(&self.db, user_id).await? {
            return Err(PortalError::AlreadySubmitted);
        }

        let application = Application::create(&self.db, user_id, fields)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err)
                    if db_err.constraint() == Some(USER_UNIQUE_CONSTRAINT) =>
                {
                    PortalError::AlreadySubmitted
                }
                _ => PortalError::Database(e),
            })?;

        info!(
            application_id = %application.id,
            user_id = %user_id,
            company = %application.company_name,
            "Application submitted"
        );

        self.feed
            .publish(ApplicationEvent::submitted(application.id, user_id));

        Ok(application.id)
    }

    /// Overwrites the editable fields of the caller's pending application
    ///
    /// `id`, `user_id`, `status`, and `created_at` are untouched.
    ///
    /// # Errors
    ///
    /// Checked in order:
    /// - `NotAuthenticated` when the caller is anonymous
    /// - `NotFound` when the id does not exist or belongs to another user
    /// - `NotEditable` when the application has left pending
    pub async fn update_application(
        &self,
        caller: Option<Uuid>,
        id: Uuid,
        fields: &ApplicationFields,
    ) -> Result<(), PortalError> {
        let user_id = caller.ok_or(PortalError::NotAuthenticated)?;

        let application = Application::find_by_id_and_owner(&self.db, id, user_id)
            .await?
            .ok_or(PortalError::NotFound)?;

        if !application.status.is_editable() {
            return Err(PortalError::NotEditable);
        }

        // The write itself re-checks the status, so a concurrent review
        // transition between the read and this write surfaces as NotEditable
        // rather than silently overwriting a reviewed application.
        let updated = Application::update_fields(&self.db, id, fields).await?;
        if updated.is_none() {
            return Err(PortalError::NotEditable);
        }

        debug!(application_id = %id, user_id = %user_id, "Application updated");

        self.feed.publish(ApplicationEvent::updated(id, user_id));

        Ok(())
    }
}
