//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/metrics` : the line-format payload the next tick would push

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.exporter().preview() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(kind = e.kind().as_str(), error = %e, "metrics preview failed");
            (StatusCode::SERVICE_UNAVAILABLE, e.kind().as_str()).into_response()
        }
    }
}
