use crate::domain::enums::OrderStatus;
use crate::utils::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 下单请求中由客户端提供的字段
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub subject: String,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub out_trade_no: String,
    pub subject: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub trade_no: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// 以存储分配的 id 创建订单，同时生成商户订单号
    pub fn new(id: u64, draft: NewOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            out_trade_no: Self::out_trade_no_for(id, created_at),
            subject: draft.subject,
            total_amount: draft.total_amount,
            status: OrderStatus::Created,
            trade_no: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// 商户订单号：创建日期(YYYYMMDD) + 订单 id
    pub fn out_trade_no_for(id: u64, created_at: DateTime<Utc>) -> String {
        format!("{}{}", created_at.format("%Y%m%d"), id)
    }

    pub fn is_paid(&self) -> bool {
        matches!(self.status, OrderStatus::Paid)
    }

    /// CREATED -> PAID，重复调用视为非法转换
    pub fn mark_paid(&mut self, trade_no: &str, at: DateTime<Utc>) -> AppResult<()> {
        if self.is_paid() {
            return Err(AppError::invalid_transition(format!(
                "order {} is already {}",
                self.out_trade_no, self.status
            )));
        }

        self.status = OrderStatus::Paid;
        self.trade_no = Some(trade_no.to_string());
        self.updated_at = at;
        Ok(())
    }
}
