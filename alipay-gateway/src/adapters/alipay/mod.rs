use crate::config::AlipayConfig;
use crate::domain::amount::format_amount;
use crate::domain::entities::{Order, Refund};
use crate::utils::canonical::{self, Fields};
use crate::utils::crypto::{GatewayVerifier, MerchantSigner};
use crate::utils::error::AppResult;
use crate::utils::http_client::HttpClient;
use chrono::Local;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub mod models;

use models::{
    AppPayContent, RefundContent, RequestEnvelope, TradeRefundReply, TradeRefundResponse,
    API_VERSION, METHOD_TRADE_APP_PAY, METHOD_TRADE_REFUND, PRODUCT_CODE_APP_PAY, SIGN_TYPE_RSA2,
    TIMESTAMP_FORMAT,
};

const PAYLOAD_PLACEHOLDER: &str = "{payload}";

/// 签名完成的请求
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// 参与签名的字段
    pub fields: Fields,
    /// 待签名串
    pub sign_content: String,
    pub sign: String,
    /// URL 编码后的完整请求串（包含 sign）
    pub encoded: String,
}

#[derive(Debug, Clone)]
pub struct AlipayClient {
    config: AlipayConfig,
    signer: MerchantSigner,
    verifier: GatewayVerifier,
    http: HttpClient,
}

impl AlipayClient {
    /// 创建客户端，密钥在这里解析，配置错误会在启动时暴露
    pub fn new(config: AlipayConfig, http: HttpClient) -> AppResult<Self> {
        let signer = MerchantSigner::from_key_material(&config.private_key)?;
        let verifier = GatewayVerifier::from_key_material(&config.alipay_public_key)?;

        Ok(Self {
            config,
            signer,
            verifier,
            http,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }

    pub fn config(&self) -> &AlipayConfig {
        &self.config
    }

    // 构建公共请求参数
    fn build_envelope<T: Serialize>(
        &self,
        method: &'static str,
        format: Option<&'static str>,
        charset: &'static str,
        notify_url: Option<String>,
        biz_content: &T,
    ) -> AppResult<RequestEnvelope> {
        Ok(RequestEnvelope {
            app_id: self.config.app_id.clone(),
            method,
            format,
            charset,
            sign_type: SIGN_TYPE_RSA2,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            version: API_VERSION,
            notify_url,
            biz_content: serde_json::to_string(biz_content)?,
        })
    }

    /// 对公共参数签名并生成请求串
    pub fn sign_request(&self, envelope: &RequestEnvelope) -> AppResult<SignedRequest> {
        let fields = canonical::to_fields(envelope)?;
        let sign_content = canonical::canonicalize(&fields);
        let sign = self.signer.sign(&sign_content)?;
        let encoded = canonical::encode_transport(&fields, &sign);

        debug!(method = envelope.method, sign_content = %sign_content, "Signed Alipay request");

        Ok(SignedRequest {
            fields,
            sign_content,
            sign,
            encoded,
        })
    }

    /// APP 支付：生成交给客户端 SDK 的 orderString，不发起网络请求
    pub fn app_pay_order_string(&self, order: &Order) -> AppResult<SignedRequest> {
        let biz_content = AppPayContent {
            subject: order.subject.clone(),
            total_amount: format_amount(order.total_amount),
            product_code: PRODUCT_CODE_APP_PAY,
            out_trade_no: order.out_trade_no.clone(),
        };

        let envelope = self.build_envelope(
            METHOD_TRADE_APP_PAY,
            Some("json"),
            "UTF-8",
            Some(self.config.notify_url.clone()),
            &biz_content,
        )?;

        self.sign_request(&envelope)
    }

    /// 异步通知验签，使用支付宝公钥
    pub fn verify_notification(&self, fields: &HashMap<String, String>) -> bool {
        let sign = match fields.get(canonical::SIGN_FIELD) {
            Some(sign) if !sign.is_empty() => sign,
            _ => {
                warn!("Alipay notification without sign");
                return false;
            }
        };

        let sign_content = canonical::canonicalize(&canonical::strip_protocol_fields(fields));
        if sign_content.is_empty() {
            return false;
        }

        self.verifier.verify(&sign_content, sign)
    }

    /// 把请求串放进网关地址模板
    pub fn gateway_url(&self, encoded: &str) -> String {
        let template = &self.config.gateway_url;
        if template.contains(PAYLOAD_PLACEHOLDER) {
            template.replace(PAYLOAD_PLACEHOLDER, encoded)
        } else if template.contains('?') {
            format!("{}&{}", template, encoded)
        } else {
            format!("{}?{}", template, encoded)
        }
    }

    /// alipay.trade.refund，同步调用网关
    pub async fn trade_refund(&self, refund: &Refund) -> AppResult<TradeRefundResponse> {
        info!(
            "Creating Alipay refund {} for order {}",
            refund.out_refund_no, refund.out_trade_no
        );

        let biz_content = RefundContent {
            refund_reason: refund.refund_reason.clone().filter(|r| !r.is_empty()),
            refund_amount: format_amount(refund.refund_amount),
            out_trade_no: refund.out_trade_no.clone(),
            out_request_no: refund.out_refund_no.clone(),
        };

        let envelope = self.build_envelope(METHOD_TRADE_REFUND, None, "utf-8", None, &biz_content)?;
        let signed = self.sign_request(&envelope)?;

        let reply: TradeRefundReply = self.http.get_json(&self.gateway_url(&signed.encoded)).await?;
        Ok(reply.response)
    }
}
