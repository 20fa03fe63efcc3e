//! Axum router wiring.
//!
//! The agent only serves operational routes itself; the host service merges
//! its application routes in and every request goes through the tracking layer.

use axum::{routing::get, Router};

use crate::{app_state::AppState, middleware, ops};

pub fn build_router(state: AppState) -> Router {
    build_with_app(state, Router::new())
}

/// Merge `app` with the operational routes and track every request.
pub fn build_with_app(state: AppState, app: Router) -> Router {
    let hooks = state.hooks();
    let ops = Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .with_state(state);

    middleware::instrument(app.merge(ops), hooks)
}
