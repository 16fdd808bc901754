pub mod autoplay;
pub mod health;
pub mod registry;
pub mod sessions;
pub mod strategies;

use crate::config::Config;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use registry::{RegistryError, SessionEntry, SessionRegistry};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new(config.max_sessions)),
            config,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/strategies", get(strategies::list_strategies))
        .route("/v1/sessions", post(sessions::create_session))
        .route(
            "/v1/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/v1/sessions/:id/recommend", post(sessions::recommend))
        .route("/v1/sessions/:id/resolve", post(sessions::resolve))
        .route("/v1/sessions/:id/reset", post(sessions::reset))
        .route("/v1/sessions/:id/stakes/adjust", post(sessions::adjust_stakes))
        .route("/v1/sessions/:id/stakes/:index", put(sessions::edit_stake))
        .route("/v1/sessions/:id/base-unit", put(sessions::set_base_unit))
        .route("/v1/sessions/:id/road", get(sessions::get_road))
        .route("/v1/sessions/:id/history.csv", get(sessions::export_history))
        .route("/v1/sessions/:id/autoplay", post(autoplay::control_autoplay))
        .layer(cors)
        .with_state(state)
}
