use crate::domain::enums::RefundStatus;
use crate::utils::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const OUT_REFUND_NO_PREFIX: &str = "alipay-refund";

#[derive(Debug, Clone)]
pub struct NewRefund {
    pub out_trade_no: String,
    pub refund_amount: Decimal,
    pub refund_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: u64,
    pub out_refund_no: String,
    pub out_trade_no: String,
    pub refund_amount: Decimal,
    pub refund_reason: Option<String>,
    pub status: RefundStatus,
    pub trade_no: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Refund {
    pub fn new(id: u64, draft: NewRefund, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            out_refund_no: Self::out_refund_no_for(id, created_at),
            out_trade_no: draft.out_trade_no,
            refund_amount: draft.refund_amount,
            refund_reason: draft.refund_reason,
            status: RefundStatus::Requested,
            trade_no: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// 退款单号：固定前缀 + 创建日期(YYYYMMDD) + 退款 id
    pub fn out_refund_no_for(id: u64, created_at: DateTime<Utc>) -> String {
        format!("{}{}{}", OUT_REFUND_NO_PREFIX, created_at.format("%Y%m%d"), id)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, RefundStatus::Completed)
    }

    pub fn mark_completed(&mut self, trade_no: &str, at: DateTime<Utc>) -> AppResult<()> {
        if self.is_completed() {
            return Err(AppError::invalid_transition(format!(
                "refund {} is already {}",
                self.out_refund_no, self.status
            )));
        }

        self.status = RefundStatus::Completed;
        self.trade_no = Some(trade_no.to_string());
        self.updated_at = at;
        Ok(())
    }
}
