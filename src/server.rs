use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::permissions::AccessControl;
use crate::auth::TokenSigner;
use crate::config::AppConfig;
use crate::database::{CollectionRegistry, DatabaseManager, UserStore};
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::{
    authorize_middleware, basic_auth_middleware, bearer_auth_middleware, resolve_model_middleware,
};

/// Shared handles every request is served from
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub users: Arc<UserStore>,
    pub collections: Arc<CollectionRegistry>,
    pub access: Arc<AccessControl>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Open the database, wire up the stores and create any missing tables.
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let signer = TokenSigner::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)?;
        let pool = DatabaseManager::connect(&config.database).await?;

        let users = UserStore::new(pool.clone(), signer, config.security.password_hashing);
        users.sync().await?;

        let collections = CollectionRegistry::standard(&pool);
        collections.sync().await?;
        tracing::info!(
            "Serving collections: {}",
            collections.names().collect::<Vec<_>>().join(", ")
        );

        Ok(Self {
            pool,
            users: Arc::new(users),
            collections: Arc::new(collections),
            access: Arc::new(config.security.access.clone()),
            config: Arc::new(config),
        })
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/health", get(handlers::system::health))
        .nest("/api/v1", v1_routes(&state))
        .nest("/api/v2", v2_routes(&state))
        .fallback(handlers::system::not_found)
        .with_state(state.clone())
        .layer(CatchPanicLayer::custom(handle_panic));

    if state.config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if state.config.server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn v1_routes(state: &AppState) -> Router<AppState> {
    let signin = Router::new()
        .route("/signin", post(handlers::auth::signin))
        .route_layer(from_fn_with_state(state.clone(), basic_auth_middleware));

    let protected = Router::new()
        .route("/users", get(handlers::auth::users))
        .route("/secret", get(handlers::auth::secret))
        .route_layer(from_fn_with_state(state.clone(), bearer_auth_middleware));

    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .merge(signin)
        .merge(protected)
        .merge(model_routes(state, false))
}

fn v2_routes(state: &AppState) -> Router<AppState> {
    model_routes(state, true)
}

/// `/:model` and `/:model/:id` with the model bound first, then bearer auth,
/// then (optionally) the role check.
fn model_routes(state: &AppState, check_roles: bool) -> Router<AppState> {
    use handlers::data;

    let mut router = Router::new()
        .route("/:model", get(data::list).post(data::create))
        .route(
            "/:model/:id",
            get(data::show).put(data::update).delete(data::remove),
        );

    // Layers added later wrap the earlier ones and run first
    if check_roles {
        router = router.route_layer(from_fn_with_state(state.clone(), authorize_middleware));
    }
    router
        .route_layer(from_fn_with_state(state.clone(), bearer_auth_middleware))
        .route_layer(from_fn_with_state(state.clone(), resolve_model_middleware))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Request handler panicked: {}", detail);

    axum::response::IntoResponse::into_response(ApiError::internal_server_error(
        "An error occurred while processing your request",
    ))
}
