use crate::api::routes;
use crate::app_state::AppState;
use crate::config::AppConfig;
use crate::infrastructure::database::init_database;
use crate::repositories::{
    InMemoryOrderRepository, InMemoryRefundRepository, MySqlOrderRepository, MySqlRefundRepository,
    OrderRepository, RefundRepository,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

/// 根据配置选择存储并组装应用状态
pub async fn build_state(config: AppConfig) -> Result<Arc<AppState>> {
    let (order_repository, refund_repository): (Arc<dyn OrderRepository>, Arc<dyn RefundRepository>) =
        match &config.database {
            Some(database) => {
                let pool = init_database(database).await?;
                (
                    Arc::new(MySqlOrderRepository::new(pool.clone())) as Arc<dyn OrderRepository>,
                    Arc::new(MySqlRefundRepository::new(pool)) as Arc<dyn RefundRepository>,
                )
            }
            None => {
                warn!("No database configured, using in-memory storage");
                (
                    Arc::new(InMemoryOrderRepository::new()) as Arc<dyn OrderRepository>,
                    Arc::new(InMemoryRefundRepository::new()) as Arc<dyn RefundRepository>,
                )
            }
        };

    let state = AppState::new(&config, order_repository, refund_repository)
        .context("Failed to initialize application state")?;
    Ok(Arc::new(state))
}

pub async fn run(config: AppConfig) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let request_timeout = Duration::from_secs(config.server.request_timeout);

    let state = build_state(config).await?;
    let app = routes::create_router(state).layer(TimeoutLayer::new(request_timeout));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => warn!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
