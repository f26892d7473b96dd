//! 支付宝开放平台请求/响应报文

use serde::{Deserialize, Serialize};

pub const METHOD_TRADE_APP_PAY: &str = "alipay.trade.app.pay";
pub const METHOD_TRADE_REFUND: &str = "alipay.trade.refund";
pub const PRODUCT_CODE_APP_PAY: &str = "QUICK_MSECURITY_PAY";
pub const SIGN_TYPE_RSA2: &str = "RSA2";
pub const API_VERSION: &str = "1.0";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 网关返回的业务成功码
pub const SUCCESS_CODE: &str = "10000";

/// 公共请求参数
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    pub app_id: String,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    pub charset: &'static str,
    pub sign_type: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    /// 业务参数的紧凑 JSON
    pub biz_content: String,
}

/// alipay.trade.app.pay 业务参数
#[derive(Debug, Clone, Serialize)]
pub struct AppPayContent {
    pub subject: String,
    pub total_amount: String,
    pub product_code: &'static str,
    pub out_trade_no: String,
}

/// alipay.trade.refund 业务参数
#[derive(Debug, Clone, Serialize)]
pub struct RefundContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_reason: Option<String>,
    pub refund_amount: String,
    pub out_trade_no: String,
    /// 同一笔退款重复提交时保持不变，网关据此幂等
    pub out_request_no: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeRefundResponse {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    pub sub_code: Option<String>,
    pub sub_msg: Option<String>,
    pub trade_no: Option<String>,
    pub out_trade_no: Option<String>,
    pub refund_fee: Option<String>,
    pub fund_change: Option<String>,
}

impl TradeRefundResponse {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// 失败原因，优先使用 sub_msg
    pub fn failure_message(&self) -> String {
        self.sub_msg
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.msg.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeRefundReply {
    #[serde(rename = "alipay_trade_refund_response")]
    pub response: TradeRefundResponse,
    #[serde(default)]
    pub sign: Option<String>,
}
