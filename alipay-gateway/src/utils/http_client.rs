use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn, Instrument};
use uuid::Uuid;

use crate::config::HttpConfig;
use crate::utils::error::{AppError, AppResult};

// HTTP客户端配置
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
    pub log_bodies: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
            retry_count: 2,
            retry_delay: Duration::from_millis(500),
            user_agent: format!("AlipayGateway/{}", env!("CARGO_PKG_VERSION")),
            log_bodies: true,
        }
    }
}

impl From<&HttpConfig> for HttpClientConfig {
    fn from(config: &HttpConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout),
            connect_timeout: Duration::from_secs(config.connect_timeout),
            retry_count: config.retry_count,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            log_bodies: config.log_bodies,
            ..Self::default()
        }
    }
}

static SENSITIVE_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<key>sign|app_cert_sn|alipay_root_cert_sn)=[^&]*").expect("static regex")
});

static SENSITIVE_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(?P<key>sign|app_cert_sn|alipay_cert_sn)"\s*:\s*"[^"]*""#).expect("static regex")
});

// 遮蔽URL和响应中的签名
fn mask_sensitive_data(data: &str) -> String {
    let masked = SENSITIVE_QUERY.replace_all(data, "$key=*****");
    SENSITIVE_JSON.replace_all(&masked, "\"$key\":\"*****\"").into_owned()
}

// HTTP客户端
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// GET 请求并把响应体解析为 JSON
    pub async fn get_json<U>(&self, url: &str) -> AppResult<U>
    where
        U: DeserializeOwned,
    {
        let request_id = Uuid::new_v4().to_string();
        let masked_url = mask_sensitive_data(url);
        let span = tracing::info_span!("http_request", method = "GET", url = %masked_url, %request_id);

        self.fetch_json(url, &request_id, &masked_url).instrument(span).await
    }

    async fn fetch_json<U>(&self, url: &str, request_id: &str, masked_url: &str) -> AppResult<U>
    where
        U: DeserializeOwned,
    {
        debug!(request_id = %request_id, url = %masked_url, "HTTP request");

        let response = self.send_with_retry(self.client.get(url)).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::network(format!("Failed to read response body: {}", e)))?;

        if self.config.log_bodies {
            debug!(
                request_id = %request_id,
                status = %status.as_u16(),
                response = %mask_sensitive_data(&body),
                "HTTP response"
            );
        }

        if !status.is_success() {
            return Err(AppError::network(format!("Gateway responded with HTTP {}", status.as_u16())));
        }

        serde_json::from_str::<U>(&body).map_err(|e| {
            error!(request_id = %request_id, error = %e, "Failed to parse response");
            AppError::from(e)
        })
    }

    // 带重试的请求发送
    async fn send_with_retry(&self, request: RequestBuilder) -> AppResult<Response> {
        let mut retry_count = 0;
        let max_retries = self.config.retry_count;

        loop {
            let request_clone = request
                .try_clone()
                .ok_or_else(|| AppError::network("Cannot clone request"))?;

            match request_clone.send().await {
                Ok(response) => {
                    let status = response.status();

                    // 5xx 和 429 需要重试
                    let should_retry = status.is_server_error() || status.as_u16() == 429;

                    if !should_retry || retry_count >= max_retries {
                        return Ok(response);
                    }

                    warn!(
                        retry = retry_count + 1,
                        max_retries = max_retries,
                        status = %status.as_u16(),
                        "Retrying request due to server error"
                    );
                }
                Err(e) => {
                    if retry_count >= max_retries {
                        return Err(AppError::network(format!(
                            "HTTP request failed after {} retries: {}",
                            max_retries, e
                        )));
                    }

                    warn!(
                        retry = retry_count + 1,
                        max_retries = max_retries,
                        error = %e,
                        "Retrying request due to network error"
                    );
                }
            }

            retry_count += 1;
            sleep(self.config.retry_delay).await;
        }
    }
}
