#![allow(dead_code)]

use alipay_gateway::api::routes::create_router;
use alipay_gateway::app_state::AppState;
use alipay_gateway::config::AppConfig;
use alipay_gateway::repositories::{InMemoryOrderRepository, InMemoryRefundRepository};
use alipay_gateway::utils::canonical;
use alipay_gateway::utils::crypto::MerchantSigner;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use openssl::rsa::Rsa;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

pub const APP_ID: &str = "2021000123456789";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub orders: InMemoryOrderRepository,
    pub refunds: InMemoryRefundRepository,
    /// 扮演支付宝，给通知签名
    pub gateway_signer: MerchantSigner,
}

fn pem_pair() -> (String, String) {
    let rsa = Rsa::generate(2048).unwrap();
    (
        String::from_utf8(rsa.private_key_to_pem().unwrap()).unwrap(),
        String::from_utf8(rsa.public_key_to_pem().unwrap()).unwrap(),
    )
}

pub fn test_config(gateway_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = "test".to_string();
    config.alipay.app_id = APP_ID.to_string();
    config.alipay.gateway_url = gateway_url.to_string();
    config.http.retry_count = 0;
    config.http.retry_delay_ms = 10;
    config
}

pub fn spawn_app(gateway_url: &str) -> TestApp {
    let (merchant_private, _) = pem_pair();
    let (gateway_private, gateway_public) = pem_pair();

    let mut config = test_config(gateway_url);
    config.alipay.private_key = merchant_private;
    config.alipay.alipay_public_key = gateway_public;

    let orders = InMemoryOrderRepository::new();
    let refunds = InMemoryRefundRepository::new();
    let state = Arc::new(
        AppState::new(&config, Arc::new(orders.clone()), Arc::new(refunds.clone())).unwrap(),
    );

    TestApp {
        router: create_router(state.clone()),
        state,
        orders,
        refunds,
        gateway_signer: MerchantSigner::from_key_material(&gateway_private).unwrap(),
    }
}

impl TestApp {
    /// 生成一条带签名的通知表单
    pub fn signed_notification(&self, pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut fields: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let content = canonical::canonicalize(&canonical::strip_protocol_fields(&fields));
        fields.insert("sign".to_string(), self.gateway_signer.sign(&content).unwrap());
        fields.insert("sign_type".to_string(), "RSA2".to_string());
        fields
    }

    pub async fn post_form(&self, uri: &str, fields: &HashMap<String, String>) -> (StatusCode, String) {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, text) = self.send(request).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, text) = self.send(request).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}
