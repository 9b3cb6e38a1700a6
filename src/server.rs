use anyhow::{Context, Result};
use std::future::Future;
use tracing::{info, warn};

use crate::{api, config::Config, slot::AppState};

/// Binds the configured address and serves the slot API until `shutdown`
/// resolves. A failed bind is returned as an error before anything is served.
pub async fn serve<F>(cfg: &Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app_state = AppState::new(cfg);
    let app = api::router(app_state.clone(), &cfg.server);

    let addr = cfg.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        %addr,
        identity = app_state.identity(),
        max_delay_ms = app_state.latency.max_delay_ms(),
        "starting slot server"
    );
    for (method, path) in api::ENDPOINTS {
        info!(method, url = %format!("http://localhost:{}{}", cfg.server.port, path), "endpoint");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    warn!(identity = app_state.identity(), "shutdown complete");
    Ok(())
}
