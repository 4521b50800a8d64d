/// Public aggregate counts
///
/// Backs the numbers on the landing page. Unauthenticated and
/// side-effect-free.
///
/// # Endpoint
///
/// ```text
/// GET /v1/stats
/// ```
///
/// # Response
///
/// ```json
/// {
///   "total": 42,
///   "pending": 20,
///   "reviewing": 12,
///   "accepted": 7
/// }
/// ```
///
/// Rejected applications count toward `total` but are not broken out.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use launchpad_shared::models::application::ApplicationStats;

/// Stats handler
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<ApplicationStats>> {
    let stats = state.portal.get_stats().await?;

    Ok(Json(stats))
}
