use alipay_gateway::{config::AppConfig, infrastructure::logging::init_logging, server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化配置
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    // 初始化日志
    let _guard = init_logging(&config)?;

    info!(
        "Starting {} ({})...",
        config.service_name, config.environment
    );

    server::run(config).await
}
