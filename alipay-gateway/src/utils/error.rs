use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use std::fmt;
use tracing::error;

// API响应结构
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "0".to_string(),
            message: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            code: code.to_string(),
            message: message.to_string(),
            data: None,
        }
    }

    /// 业务未完成但不是错误（例如退款被渠道拒绝，可重试），仍然携带数据
    pub fn pending(code: &str, message: &str, data: T) -> Self {
        Self {
            success: false,
            code: code.to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

// 业务错误代码枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // 系统错误 (1xxx)
    InternalServerError = 1000,
    DatabaseError = 1001,
    ConfigError = 1003,
    NetworkError = 1004,

    // 请求错误 (3xxx)
    ResourceNotFound = 3002,

    // 业务错误 (4xxx)
    ValidationFailed = 4000,
    RefundFailed = 4004,
    DuplicateRequest = 4005,
    InvalidStateTransition = 4010,

    // 第三方服务错误 (5xxx)
    ChannelInvalidResponse = 5003,
    CryptoError = 5100,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalServerError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
            Self::NetworkError => "Network error",

            Self::ResourceNotFound => "Resource not found",

            Self::ValidationFailed => "Validation failed",
            Self::RefundFailed => "Refund failed",
            Self::DuplicateRequest => "Duplicate request",
            Self::InvalidStateTransition => "Invalid state transition",

            Self::ChannelInvalidResponse => "Channel invalid response",
            Self::CryptoError => "Crypto error",
        }
    }

    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    pub fn as_status_code(&self) -> StatusCode {
        match self {
            Self::InternalServerError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::CryptoError => StatusCode::INTERNAL_SERVER_ERROR,

            Self::NetworkError => StatusCode::BAD_GATEWAY,

            Self::ResourceNotFound => StatusCode::NOT_FOUND,

            Self::ValidationFailed | Self::RefundFailed => StatusCode::BAD_REQUEST,

            Self::DuplicateRequest | Self::InvalidStateTransition => StatusCode::CONFLICT,

            Self::ChannelInvalidResponse => StatusCode::BAD_GATEWAY,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// 应用错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Application error: {0}")]
    Application(ErrorCode, String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    InternalServer(anyhow::Error),
}

impl AppError {
    pub fn application(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Application(code, message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidStateTransition(message.into())
    }

    pub fn internal_server(err: impl Into<anyhow::Error>) -> Self {
        Self::InternalServer(err.into())
    }

    // 获取错误对应的HTTP状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Application(code, _) => code.as_status_code(),
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Network(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidStateTransition(_) => StatusCode::CONFLICT,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InternalServer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // 获取错误代码
    pub fn error_code(&self) -> String {
        match self {
            Self::Application(code, _) => code.as_u16().to_string(),
            Self::Database(_) => ErrorCode::DatabaseError.as_u16().to_string(),
            Self::Config(_) => ErrorCode::ConfigError.as_u16().to_string(),
            Self::Validation(_) => ErrorCode::ValidationFailed.as_u16().to_string(),
            Self::Crypto(_) => ErrorCode::CryptoError.as_u16().to_string(),
            Self::Network(_) => ErrorCode::NetworkError.as_u16().to_string(),
            Self::NotFound(_) => ErrorCode::ResourceNotFound.as_u16().to_string(),
            Self::Conflict(_) => ErrorCode::DuplicateRequest.as_u16().to_string(),
            Self::InvalidStateTransition(_) => ErrorCode::InvalidStateTransition.as_u16().to_string(),
            Self::Serialization(_) => ErrorCode::ChannelInvalidResponse.as_u16().to_string(),
            Self::InternalServer(_) => ErrorCode::InternalServerError.as_u16().to_string(),
        }
    }

    // 获取用户友好的错误消息
    pub fn user_message(&self) -> String {
        match self {
            Self::Application(_, msg) => msg.clone(),
            Self::Database(err) => {
                error!("Database error: {}", err);
                "A database error occurred. Please try again later.".to_string()
            }
            Self::Config(err) => {
                error!("Configuration error: {}", err);
                "Service is misconfigured.".to_string()
            }
            Self::Crypto(msg) => {
                error!("Crypto error: {}", msg);
                "Failed to sign the request.".to_string()
            }
            Self::Serialization(err) => {
                error!("Serialization error: {}", err);
                "Failed to encode or decode a message.".to_string()
            }
            Self::Validation(msg) => msg.clone(),
            Self::Network(msg) => msg.clone(),
            Self::NotFound(msg) => msg.clone(),
            Self::Conflict(msg) => msg.clone(),
            Self::InvalidStateTransition(msg) => msg.clone(),
            Self::InternalServer(err) => {
                error!("Internal server error: {:#}", err);
                "An internal error occurred. Please try again later.".to_string()
            }
        }
    }
}

// 将AppError转换为Axum响应
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.user_message();

        let response = ApiResponse::<()>::error(&code, &message);

        // 记录5xx错误
        if status.is_server_error() {
            error!(
                status_code = %status.as_u16(),
                error_code = %code,
                error_message = %message,
                "Server error occurred"
            );
        }

        (status, Json(response)).into_response()
    }
}

// 处理anyhow::Error的转换
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServer(err)
    }
}

impl From<openssl::error::ErrorStack> for AppError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        Self::Crypto(err.to_string())
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
