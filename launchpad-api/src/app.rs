/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use launchpad_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = launchpad_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use launchpad_shared::auth::jwt;
use launchpad_shared::auth::middleware::{bearer_token, CallerIdentity};
use launchpad_shared::events::ChangeFeed;
use launchpad_shared::portal::Portal;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// The portal service
    pub portal: Portal,
}

impl AppState {
    /// Creates new application state
    ///
    /// The portal and its change feed are constructed here; everything that
    /// needs the feed reaches it through `portal.feed()`.
    pub fn new(db: PgPool, config: Config) -> Self {
        let portal = Portal::new(db.clone(), ChangeFeed::default());
        Self {
            db,
            config: Arc::new(config),
            portal,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /v1/                           # API v1 (versioned)
///     ├── /auth/
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /applications/
///     │   ├── GET  /me               # Caller's application (auth optional)
///     │   ├── POST /                 # Submit (auth required)
///     │   ├── PUT  /:id              # Update (auth required)
///     │   └── GET  /events           # SSE change feed (public)
///     └── GET /stats                 # Public aggregate counts
/// ```
///
/// # Authentication
///
/// Application routes pass through `resolve_identity`, which turns the
/// Authorization header into a [`CallerIdentity`] without rejecting anything.
/// The portal decides per operation whether an anonymous caller is an error,
/// so a missing or bad token on `/me` yields the empty result while the same
/// request on submit yields 401.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Application routes; identity resolved once, enforced by the portal
    let application_routes = Router::new()
        .route("/me", get(routes::applications::get_my_application))
        .route("/", post(routes::applications::submit))
        .route("/:id", put(routes::applications::update_application))
        .route("/events", get(routes::events::watch))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/applications", application_routes)
        .route("/stats", get(routes::stats::get_stats));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Identity-resolution middleware
///
/// Validates the bearer token when one is present and injects a
/// [`CallerIdentity`] into request extensions. Never rejects a request:
/// absent or invalid credentials resolve to the anonymous identity and the
/// portal raises `NotAuthenticated` where authentication is required.
async fn resolve_identity(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let caller = match bearer_token(req.headers()) {
        Ok(token) => match jwt::validate_access_token(token, state.jwt_secret()) {
            Ok(claims) => CallerIdentity::authenticated(claims.sub),
            Err(e) => {
                tracing::debug!("Discarding invalid bearer token: {}", e);
                CallerIdentity::anonymous()
            }
        },
        Err(_) => CallerIdentity::anonymous(),
    };

    req.extensions_mut().insert(caller);

    next.run(req).await
}
