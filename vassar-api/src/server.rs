use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vassar_application::context::AppContext;

use crate::config::Config;
use crate::routes::router;
use crate::seed;
use crate::state::AppState;

/// 安装全局 subscriber；`RUST_LOG` 优先于 `default_filter`
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn serve(config: Config) -> Result<()> {
    let state = AppState::connect(&config.store).await?;

    if config.seed.enabled {
        let ctx = AppContext::builder().actor_id("startup-seed").build();
        seed::load_fixture(&state, &ctx)
            .await
            .context("Failed to load seed fixture")?;
    }

    let app = router(state, config.server.static_dir.as_deref());
    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!(addr = %config.server.bind, "vassar api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received shutdown signal");
    }
}
