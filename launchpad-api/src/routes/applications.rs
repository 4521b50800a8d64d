/// Application portal endpoints
///
/// The three application operations the form and dashboard drive:
///
/// - `GET  /v1/applications/me` - The caller's own application
/// - `POST /v1/applications` - Submit a new application
/// - `PUT  /v1/applications/:id` - Edit a pending application
///
/// Identity is resolved by the router middleware; these handlers pass the
/// resolved caller to the portal, which enforces authentication per
/// operation. That is why `/me` quietly returns an empty result for an
/// anonymous caller while submit returns 401.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use launchpad_shared::auth::middleware::CallerIdentity;
use launchpad_shared::models::application::{Application, ApplicationFields};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Application form payload, shared by submit and update
///
/// Seven required fields and two optional ones, mirroring the form.
#[derive(Debug, Deserialize, Validate)]
pub struct ApplicationRequest {
    /// Company or project name
    #[validate(length(min = 1, max = 200, message = "Company name is required"))]
    pub company_name: String,

    /// One-line pitch
    #[validate(length(min = 1, max = 300, message = "Tagline is required"))]
    pub tagline: String,

    /// Long-form product description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Kind of agent being built
    #[validate(length(min = 1, max = 100, message = "Agent type is required"))]
    pub agent_type: String,

    /// Founder's name
    #[validate(length(min = 1, max = 200, message = "Founder name is required"))]
    pub founder_name: String,

    /// Founder's contact email
    #[validate(email(message = "Invalid email format"))]
    pub founder_email: String,

    /// Company website (optional)
    #[validate(length(max = 512, message = "Website must be at most 512 characters"))]
    pub website: Option<String>,

    /// Company stage
    #[validate(length(min = 1, max = 100, message = "Stage is required"))]
    pub stage: String,

    /// Funding raised (optional)
    #[validate(length(max = 200, message = "Funding must be at most 200 characters"))]
    pub funding: Option<String>,
}

impl ApplicationRequest {
    /// Validates and converts into the portal's field set
    fn into_fields(self) -> Result<ApplicationFields, ApiError> {
        self.validate().map_err(|e| {
            let errors: Vec<ValidationErrorDetail> = e
                .field_errors()
                .iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| ValidationErrorDetail {
                        field: field.to_string(),
                        message: error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    })
                })
                .collect();
            ApiError::ValidationError(errors)
        })?;

        Ok(ApplicationFields {
            company_name: self.company_name,
            tagline: self.tagline,
            description: self.description,
            agent_type: self.agent_type,
            founder_name: self.founder_name,
            founder_email: self.founder_email,
            website: self.website,
            stage: self.stage,
            funding: self.funding,
        })
    }
}

/// Response for the caller's own application
#[derive(Debug, Serialize)]
pub struct MyApplicationResponse {
    /// The caller's application, or null when none exists (or the caller is
    /// anonymous)
    pub application: Option<Application>,
}

/// Submit response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// New application ID
    pub id: Uuid,
}

/// Returns the caller's application
///
/// # Endpoint
///
/// ```text
/// GET /v1/applications/me
/// Authorization: Bearer <token>   (optional)
/// ```
///
/// Always 200; the body carries `null` when there is nothing to show.
pub async fn get_my_application(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<MyApplicationResponse>> {
    let application = state.portal.get_user_application(caller.user_id()).await?;

    Ok(Json(MyApplicationResponse { application }))
}

/// Submits a new application
///
/// # Endpoint
///
/// ```text
/// POST /v1/applications
/// Authorization: Bearer <token>
/// Content-Type: application/json
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Not authenticated
/// - `409 Conflict`: Caller already has an application
/// - `422 Unprocessable Entity`: Validation failed
pub async fn submit(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(req): Json<ApplicationRequest>,
) -> ApiResult<Json<SubmitResponse>> {
    let fields = req.into_fields()?;

    let id = state.portal.submit(caller.user_id(), &fields).await?;

    Ok(Json(SubmitResponse { id }))
}

/// Edits a pending application in place
///
/// # Endpoint
///
/// ```text
/// PUT /v1/applications/:id
/// Authorization: Bearer <token>
/// Content-Type: application/json
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Not authenticated
/// - `404 Not Found`: No such application, or not the caller's (the two are
///   indistinguishable by design)
/// - `409 Conflict`: Application is no longer editable
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_application(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplicationRequest>,
) -> ApiResult<StatusCode> {
    let fields = req.into_fields()?;

    state
        .portal
        .update_application(caller.user_id(), id, &fields)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
