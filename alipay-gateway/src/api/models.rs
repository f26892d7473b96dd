use crate::domain::amount::format_amount;
use crate::domain::entities::{Order, Refund};
use crate::services::{AppPayment, GatewayFailure};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// 创建APP支付请求
#[derive(Debug, Deserialize)]
pub struct CreateAppPaymentRequest {
    pub subject: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AppPaymentResponse {
    pub out_trade_no: String,
    pub order_string: String,
}

impl From<AppPayment> for AppPaymentResponse {
    fn from(payment: AppPayment) -> Self {
        Self {
            out_trade_no: payment.order.out_trade_no,
            order_string: payment.order_string,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub out_trade_no: String,
    pub subject: String,
    pub total_amount: String,
    pub status: String,
    pub trade_no: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            out_trade_no: order.out_trade_no,
            subject: order.subject,
            total_amount: format_amount(order.total_amount),
            status: order.status.to_string(),
            trade_no: order.trade_no,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

// 创建退款请求
#[derive(Debug, Deserialize)]
pub struct CreateRefundRequest {
    pub out_trade_no: String,
    pub refund_amount: Decimal,
    #[serde(default)]
    pub refund_reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub out_refund_no: String,
    pub out_trade_no: String,
    pub refund_amount: String,
    pub refund_reason: Option<String>,
    pub status: String,
    pub trade_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<GatewayFailure>,
    pub created_at: String,
    pub updated_at: String,
}

impl RefundResponse {
    pub fn new(refund: Refund, failure: Option<GatewayFailure>) -> Self {
        Self {
            out_refund_no: refund.out_refund_no,
            out_trade_no: refund.out_trade_no,
            refund_amount: format_amount(refund.refund_amount),
            refund_reason: refund.refund_reason,
            status: refund.status.to_string(),
            trade_no: refund.trade_no,
            failure,
            created_at: refund.created_at.to_rfc3339(),
            updated_at: refund.updated_at.to_rfc3339(),
        }
    }
}
