/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasknest_api::{app::AppState, config::Config};
/// use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasknest_shared::store::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = tasknest_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use crate::middleware::{auth::jwt_auth_layer, throttle};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use tasknest_shared::auth::{jwt::TokenCodec, password::HashCost, throttle::LoginThrottle};
use tasknest_shared::store::CredentialStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every
/// field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// User and task persistence
    pub store: Arc<dyn CredentialStore>,

    /// Session token codec holding the signing secret
    pub tokens: Arc<TokenCodec>,

    /// Attempt counters for register/login
    pub throttle: Arc<LoginThrottle>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state from a store and loaded configuration
    pub fn new(store: Arc<dyn CredentialStore>, config: Config) -> Self {
        let tokens = TokenCodec::with_ttl(
            &config.auth.jwt_secret,
            Duration::hours(config.auth.token_ttl_hours),
        );
        let throttle = LoginThrottle::new(config.auth.login_max_attempts, config.auth.login_window);

        Self {
            store,
            tokens: Arc::new(tokens),
            throttle: Arc::new(throttle),
            config: Arc::new(config),
        }
    }

    /// Argon2 parameters for new password hashes
    pub fn hash_cost(&self) -> HashCost {
        self.config.auth.hash_cost
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                    # public
/// └── /api/v1/
///     ├── /auth/                     # public, throttled
///     │   ├── POST /register
///     │   └── POST /login
///     ├── GET  /user                 # bearer token
///     └── /tasks                     # bearer token, owner-scoped
///         ├── GET    /
///         ├── POST   /
///         ├── GET    /:id
///         ├── PUT    /:id
///         └── DELETE /:id
/// ```
///
/// Layers, outermost first: CORS, tracing, then per-group throttle or
/// bearer guard.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Each route counts attempts under its own throttle scope
    let auth_routes = Router::new()
        .route(
            "/register",
            post(routes::auth::register).layer(axum::middleware::from_fn_with_state(
                state.clone(),
                throttle::throttle_register,
            )),
        )
        .route(
            "/login",
            post(routes::auth::login).layer(axum::middleware::from_fn_with_state(
                state.clone(),
                throttle::throttle_login,
            )),
        );

    let protected_routes = Router::new()
        .route("/user", get(routes::users::me))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// Permissive CORS when `*` is configured, otherwise an explicit allow-list
fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
