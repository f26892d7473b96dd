//! 金额格式化
//!
//! 支付宝金额以元为单位，保留两位小数。对账时比较的是格式化后的字符串，
//! 不比较浮点数。

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// 四舍五入到分
pub fn normalize(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// 格式化为两位小数的金额字符串，例如 `19.9` -> `"19.90"`
pub fn format_amount(amount: Decimal) -> String {
    normalize(amount).to_string()
}

/// 解析通知或请求中的金额字符串
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

/// 订单金额与通知声明的金额是否一致（按两位小数字符串比较）
pub fn amounts_match(recorded: Decimal, declared: &str) -> bool {
    match parse_amount(declared) {
        Some(declared) => format_amount(recorded) == format_amount(declared),
        None => false,
    }
}
