use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// 订单状态，只允许 CREATED -> PAID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Paid,
}

impl OrderStatus {
    pub fn as_db(&self) -> i8 {
        match self {
            Self::Created => 0,
            Self::Paid => 1,
        }
    }

    pub fn from_db(value: i8) -> Option<Self> {
        match value {
            0 => Some(Self::Created),
            1 => Some(Self::Paid),
            _ => None,
        }
    }
}

/// 退款状态，只允许 REQUESTED -> COMPLETED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    Requested,
    Completed,
}

impl RefundStatus {
    pub fn as_db(&self) -> i8 {
        match self {
            Self::Requested => 0,
            Self::Completed => 1,
        }
    }

    pub fn from_db(value: i8) -> Option<Self> {
        match value {
            0 => Some(Self::Requested),
            1 => Some(Self::Completed),
            _ => None,
        }
    }
}

/// 支付宝交易状态（异步通知中的 trade_status）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    WaitBuyerPay,
    TradeClosed,
    TradeSuccess,
    TradeFinished,
}

impl TradeStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::TradeSuccess | Self::TradeFinished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_strings() {
        assert_eq!(OrderStatus::Paid.to_string(), "PAID");
        assert_eq!(RefundStatus::Requested.to_string(), "REQUESTED");
        assert_eq!(serde_json::to_string(&OrderStatus::Created).unwrap(), "\"CREATED\"");
    }

    #[test]
    fn test_db_mapping() {
        for status in [OrderStatus::Created, OrderStatus::Paid] {
            assert_eq!(OrderStatus::from_db(status.as_db()), Some(status));
        }
        assert_eq!(RefundStatus::from_db(1), Some(RefundStatus::Completed));
        assert_eq!(RefundStatus::from_db(7), None);
    }

    #[test]
    fn test_trade_status() {
        assert!(TradeStatus::from_str("TRADE_SUCCESS").unwrap().is_paid());
        assert!(TradeStatus::from_str("TRADE_FINISHED").unwrap().is_paid());
        assert!(!TradeStatus::from_str("WAIT_BUYER_PAY").unwrap().is_paid());
        assert!(TradeStatus::from_str("UNKNOWN").is_err());
    }
}
