//! lineflux agent
//!
//! - Loads `lineflux.yaml` (or the path in `LINEFLUX_CONFIG`)
//! - Pushes line-format metrics on the configured period
//! - Serves /healthz and /metrics behind the request tracking layer

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use lineflux_agent::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("LINEFLUX_CONFIG").unwrap_or_else(|_| "lineflux.yaml".into());
    let cfg = config::load_from_file(&path).expect("config load failed");
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg).expect("agent state init failed");
    let schedule = state.start_export();
    let app = router::build_router(state);

    tracing::info!(%listen, "lineflux-agent starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("server failed");

    schedule.shutdown().await;
}
