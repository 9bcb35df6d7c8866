use std::time::Duration;

use anyhow::Context;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use crate::config::AppConfig;
use crate::database::Database;
use crate::routes::app;
use crate::state::AppState;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    // Sessions expire on inactivity; sweep the stale rows every minute
    let deletion_task = tokio::task::spawn(
        PostgresStore::new(db.pool().clone()).continuously_delete_expired(Duration::from_secs(60)),
    );

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Alumni directory listening on http://{}", bind_addr);

    let state = AppState::new(db.clone(), config);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    deletion_task.abort();
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
