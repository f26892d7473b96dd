//! 支付宝开放平台的待签名串构造
//!
//! 签名和验签都基于同一个规则：去掉空值和 `sign`，按 key 的字节序升序排列，
//! 以 `key=value` 用 `&` 连接，value 保持原样（不做 URL 编码）。
//! 任何一个字节不一致，签名都会失败。

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::utils::error::AppResult;

pub const SIGN_FIELD: &str = "sign";
pub const SIGN_TYPE_FIELD: &str = "sign_type";

/// 字段集合，BTreeMap 保证按 key 的字节序遍历
pub type Fields = BTreeMap<String, String>;

/// 构造待签名串
///
/// 过滤空值与 `sign` 字段；没有剩余字段时返回空串，验签时自然失败。
pub fn canonicalize(fields: &Fields) -> String {
    fields
        .iter()
        .filter(|(key, value)| !value.is_empty() && key.as_str() != SIGN_FIELD)
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// 异步通知验签前去掉 `sign` 和 `sign_type`，支付宝签名时不包含这两个字段
pub fn strip_protocol_fields(fields: &HashMap<String, String>) -> Fields {
    fields
        .iter()
        .filter(|(key, _)| key.as_str() != SIGN_FIELD && key.as_str() != SIGN_TYPE_FIELD)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// 将请求结构体展开为字段集合
///
/// `null` 被丢弃，字符串原样保留，其余标量使用 JSON 文本。
pub fn to_fields<T: Serialize>(message: &T) -> AppResult<Fields> {
    let mut fields = Fields::new();

    if let Value::Object(map) = serde_json::to_value(message)? {
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::String(s) => {
                    fields.insert(key, s);
                }
                other => {
                    fields.insert(key, other.to_string());
                }
            }
        }
    }

    Ok(fields)
}

/// 生成最终交给客户端 SDK（或拼接到网关 URL）的请求串
///
/// 每个非空字段的值单独做 form-urlencoded 编码，最后追加 `sign`。
pub fn encode_transport(fields: &Fields, sign: &str) -> String {
    let mut pairs: Vec<String> = fields
        .iter()
        .filter(|(key, value)| !value.is_empty() && key.as_str() != SIGN_FIELD)
        .map(|(key, value)| format!("{}={}", key, escape(value)))
        .collect();

    pairs.push(format!("{}={}", SIGN_FIELD, escape(sign)));
    pairs.join("&")
}

fn escape(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
