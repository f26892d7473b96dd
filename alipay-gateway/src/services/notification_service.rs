use crate::adapters::AlipayClient;
use crate::domain::amount::{amounts_match, format_amount};
use crate::domain::enums::TradeStatus;
use crate::repositories::OrderRepository;
use crate::utils::error::AppResult;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

pub const ACK_SUCCESS: &str = "success";
pub const ACK_FAIL: &str = "fail";

/// 异步通知的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// CREATED -> PAID
    Paid,
    /// 重复通知，或者并发通知中落后的一方
    AlreadyPaid,
    /// 交易状态不是支付成功，不做转换
    NotPaid { trade_status: String },
    OrderNotFound,
    /// 发给其他应用的通知，应答但不处理
    ForeignApp { app_id: String },
    /// 金额不一致，订单保持 CREATED，需要人工对账
    AmountMismatch { expected: String, declared: String },
    SignatureInvalid,
    /// 验签通过但缺少必要字段
    Rejected(String),
}

// 支付结果通知处理
pub struct NotificationService {
    order_repository: Arc<dyn OrderRepository>,
    alipay: Arc<AlipayClient>,
    ack_amount_mismatch: bool,
}

impl NotificationService {
    pub fn new(order_repository: Arc<dyn OrderRepository>, alipay: Arc<AlipayClient>) -> Self {
        let ack_amount_mismatch = alipay.config().ack_amount_mismatch;
        Self {
            order_repository,
            alipay,
            ack_amount_mismatch,
        }
    }

    /// 处理一条通知。验签失败等都作为结果返回，只有存储层错误才返回 Err
    pub async fn handle(&self, fields: &HashMap<String, String>) -> AppResult<NotifyOutcome> {
        if !self.alipay.verify_notification(fields) {
            warn!(
                out_trade_no = fields.get("out_trade_no").map(String::as_str).unwrap_or_default(),
                "Alipay notification signature verification failed"
            );
            return Ok(NotifyOutcome::SignatureInvalid);
        }

        // 缺省时不校验
        if let Some(app_id) = non_empty(fields, "app_id") {
            if app_id != self.alipay.app_id() {
                warn!(app_id, "Alipay notification addressed to another app, ignored");
                return Ok(NotifyOutcome::ForeignApp {
                    app_id: app_id.to_string(),
                });
            }
        }

        let Some(out_trade_no) = non_empty(fields, "out_trade_no") else {
            warn!("Alipay notification without out_trade_no");
            return Ok(NotifyOutcome::Rejected("missing out_trade_no".to_string()));
        };

        let Some(order) = self.order_repository.find_by_out_trade_no(out_trade_no).await? else {
            warn!(out_trade_no, "Alipay notification for unknown order");
            return Ok(NotifyOutcome::OrderNotFound);
        };

        if order.is_paid() {
            info!(out_trade_no, "Order already paid, notification ignored");
            return Ok(NotifyOutcome::AlreadyPaid);
        }

        if let Some(trade_status) = non_empty(fields, "trade_status") {
            let paid = TradeStatus::from_str(trade_status)
                .map(|status| status.is_paid())
                .unwrap_or(false);
            if !paid {
                info!(out_trade_no, trade_status, "Trade not paid yet");
                return Ok(NotifyOutcome::NotPaid {
                    trade_status: trade_status.to_string(),
                });
            }
        }

        let (Some(declared), Some(trade_no)) =
            (non_empty(fields, "total_amount"), non_empty(fields, "trade_no"))
        else {
            warn!(out_trade_no, "Alipay notification without total_amount or trade_no");
            return Ok(NotifyOutcome::Rejected(
                "missing total_amount or trade_no".to_string(),
            ));
        };

        if !amounts_match(order.total_amount, declared) {
            let expected = format_amount(order.total_amount);
            warn!(
                out_trade_no,
                expected = %expected,
                declared,
                "Alipay notification amount mismatch, manual reconciliation required"
            );
            return Ok(NotifyOutcome::AmountMismatch {
                expected,
                declared: declared.to_string(),
            });
        }

        if self.order_repository.mark_paid(out_trade_no, trade_no).await? {
            info!(out_trade_no, trade_no, "Order paid");
            Ok(NotifyOutcome::Paid)
        } else {
            info!(out_trade_no, "Order paid by a concurrent notification");
            Ok(NotifyOutcome::AlreadyPaid)
        }
    }

    /// 返回给支付宝的应答
    pub fn ack_for(&self, outcome: &NotifyOutcome) -> &'static str {
        match outcome {
            NotifyOutcome::Paid
            | NotifyOutcome::AlreadyPaid
            | NotifyOutcome::NotPaid { .. }
            | NotifyOutcome::OrderNotFound
            | NotifyOutcome::ForeignApp { .. } => ACK_SUCCESS,
            NotifyOutcome::AmountMismatch { .. } if self.ack_amount_mismatch => ACK_SUCCESS,
            NotifyOutcome::AmountMismatch { .. }
            | NotifyOutcome::SignatureInvalid
            | NotifyOutcome::Rejected(_) => ACK_FAIL,
        }
    }
}

fn non_empty<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .map(|value| value.as_str())
        .filter(|value| !value.is_empty())
}
