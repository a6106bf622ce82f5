pub mod indicators;
pub mod prices;
pub mod system;

use axum::{middleware, Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AuthToken};
use crate::state::AppState;

/// Assemble the API router.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(system::routes())
        .merge(prices::routes())
        .merge(indicators::routes())
}

/// Full application: routes plus auth, CORS and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    let token = state.config.token.clone();
    api_router()
        .layer(middleware::from_fn(auth::require_auth))
        .layer(Extension(AuthToken(token)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
