//! Marginalia API — HTTP surface of the comment service.
//!
//! Each comment function is mounted at `/<name>` and at
//! `/.netlify/functions/<name>`, and runs behind a [`policy::HandlerPolicy`].

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod policy;
pub mod rate_limit;
pub mod routes;
pub mod state;

use state::AppState;

/// Builds the complete application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::comments::router(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
