use crate::config::AppConfig;
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// 初始化日志。配置了文件路径时按天滚动写文件，返回的 guard 需要保持到进程退出
pub fn init_logging(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    // RUST_LOG 优先
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = config.logging.json_format;

    let stdout_json = json.then(|| fmt::layer().json().with_span_events(FmtSpan::CLOSE));
    let stdout_text = (!json).then(|| fmt::layer().with_span_events(FmtSpan::CLOSE));

    let (file_writer, guard) = match &config.logging.file_path {
        Some(file_path) => {
            let path = Path::new(file_path);
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .unwrap_or_else(|| OsStr::new("alipay-gateway.log"));
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (Some(non_blocking), Some(guard))
        }
        None => (None, None),
    };

    let file_json = file_writer
        .clone()
        .filter(|_| json)
        .map(|writer| fmt::layer().json().with_ansi(false).with_writer(writer));
    let file_text = file_writer
        .filter(|_| !json)
        .map(|writer| fmt::layer().with_ansi(false).with_writer(writer));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_json)
        .with(stdout_text)
        .with(file_json)
        .with(file_text)
        .try_init()
        .context("Failed to initialize logging")?;

    tracing::info!("Logging initialized with level: {}", config.logging.level);

    Ok(guard)
}
