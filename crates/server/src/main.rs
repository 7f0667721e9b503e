mod config;
mod http;
mod state;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::http::router::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::new().context("Failed to load configuration")?;
    let limits = settings.comments.limits();
    info!(
        "Comment limits: {} per page (max {}), {} chars per comment",
        limits.default_per_page, limits.max_per_page, limits.max_content_length
    );

    let db_url = &settings.database.url;
    let db = storage::Db::new(db_url)
        .await
        .with_context(|| format!("Failed to open database {}", db_url))?;
    let state = AppState::new(db, limits, settings.comments.bulk_limit);
    let app = build_router(state, &settings.server.cors_origins);

    let bind = (settings.server.host.as_str(), settings.server.port);
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Cannot bind {}:{}", bind.0, bind.1))?;
    info!("Agora comments API on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

// Ctrl+C 或 SIGTERM 任一到达即开始优雅退出
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Shutdown signal received, draining connections");
}
