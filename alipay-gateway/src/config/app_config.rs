use std::path::Path;
use serde::Deserialize;
use config::{Config, Environment, File};
use tracing::info;
use crate::utils::error::AppError;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64, // 秒
}

#[derive(Clone, Debug, Deserialize)]
pub struct AlipayConfig {
    pub app_id: String,
    /// 商户应用私钥，用于请求签名
    pub private_key: String,
    /// 支付宝公钥，用于异步通知验签
    pub alipay_public_key: String,
    pub notify_url: String,
    /// 网关地址模板，`{payload}` 会被替换为签名后的请求串；没有占位符时拼接为查询串
    pub gateway_url: String,
    /// 金额不一致时是否仍然回复 success（回复 fail 会让支付宝持续重试通知）
    #[serde(default = "default_ack_amount_mismatch")]
    pub ack_amount_mismatch: bool,
}

fn default_ack_amount_mismatch() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct HttpConfig {
    pub timeout: u64,         // 秒
    pub connect_timeout: u64, // 秒
    pub retry_count: u32,
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub log_bodies: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64, // 秒
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
    pub file_path: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub alipay: AlipayConfig,
    pub http: HttpConfig,
    /// 未配置时使用内存存储
    pub database: Option<DatabaseConfig>,
    pub logging: LoggingConfig,
    pub environment: String,
    pub service_name: String,
}

impl AppConfig {
    pub fn load() -> std::result::Result<Self, AppError> {

        let config_path = dotenvy::var("CONFIG_PATH").unwrap_or_else(|_| {
            format!("{}/config/application.toml", env!("CARGO_MANIFEST_DIR"))
        });

        info!("Loading configuration from {}", &config_path);

        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &str) -> std::result::Result<Self, AppError> {
        let builder = Config::builder()
            .add_source(File::from(Path::new(config_path)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"));

        let config = builder.build()?;
        let config: AppConfig = config.try_deserialize()?;

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_timeout: 30,
            },
            alipay: AlipayConfig {
                app_id: String::new(),
                private_key: String::new(),
                alipay_public_key: String::new(),
                notify_url: "https://example.com/api/v1/notifications/alipay".to_string(),
                gateway_url: "https://openapi.alipay.com/gateway.do?{payload}".to_string(),
                ack_amount_mismatch: true,
            },
            http: HttpConfig {
                timeout: 15,
                connect_timeout: 5,
                retry_count: 2,
                retry_delay_ms: 500,
                log_bodies: false,
            },
            database: None,
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
                file_path: None,
            },
            environment: "development".to_string(),
            service_name: "alipay-gateway".to_string(),
        }
    }
}
