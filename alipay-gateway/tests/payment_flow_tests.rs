mod common;

use alipay_gateway::domain::enums::OrderStatus;
use alipay_gateway::repositories::OrderRepository;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{spawn_app, APP_ID};
use serde_json::json;

async fn create_order(app: &common::TestApp, total_amount: &str) -> String {
    let (status, body) = app
        .post_json(
            "/api/v1/payments/alipay/app",
            json!({"subject": "年度会员", "total_amount": total_amount}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    body["data"]["out_trade_no"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_create_payment_returns_signed_order_string() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");
    let (status, body) = app
        .post_json(
            "/api/v1/payments/alipay/app",
            json!({"subject": "年度会员", "total_amount": "100"}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let order_string = body["data"]["order_string"].as_str().unwrap();
    assert!(order_string.starts_with(&format!("app_id={}&biz_content=", APP_ID)));
    assert!(order_string.contains("sign_type=RSA2"));
    assert!(order_string.contains("&sign="));

    let out_trade_no = body["data"]["out_trade_no"].as_str().unwrap();
    let (status, order) = app.get_json(&format!("/api/v1/orders/{}", out_trade_no)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["data"]["status"], "CREATED");
    assert_eq!(order["data"]["total_amount"], "100.00");
}

#[tokio::test]
async fn test_invalid_payment_request_is_rejected() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");
    let (status, body) = app
        .post_json(
            "/api/v1/payments/alipay/app",
            json!({"subject": "", "total_amount": "100"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_order_query() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");
    let (status, body) = app.get_json("/api/v1/orders/20240101999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_notification_marks_order_paid_once() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");
    let out_trade_no = create_order(&app, "100.00").await;

    let fields = app.signed_notification(&[
        ("app_id", APP_ID),
        ("out_trade_no", out_trade_no.as_str()),
        ("total_amount", "100.00"),
        ("trade_no", "2024010122001"),
        ("trade_status", "TRADE_SUCCESS"),
        ("subject", "年度会员"),
    ]);

    let (status, ack) = app.post_form("/api/v1/notifications/alipay", &fields).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, "success");

    let paid = app.orders.find_by_out_trade_no(&out_trade_no).await.unwrap().unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert_eq!(paid.trade_no.as_deref(), Some("2024010122001"));

    // 支付宝重复投递
    let (_, ack) = app.post_form("/api/v1/notifications/alipay", &fields).await;
    assert_eq!(ack, "success");
    let replayed = app.orders.find_by_out_trade_no(&out_trade_no).await.unwrap().unwrap();
    assert_eq!(replayed, paid);
}

#[tokio::test]
async fn test_tampered_notification_is_answered_with_fail() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");
    let out_trade_no = create_order(&app, "100.00").await;

    let mut fields = app.signed_notification(&[
        ("out_trade_no", out_trade_no.as_str()),
        ("total_amount", "100.00"),
        ("trade_no", "2024010122001"),
    ]);
    fields.insert("total_amount".to_string(), "1.00".to_string());

    let (status, ack) = app.post_form("/api/v1/notifications/alipay", &fields).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, "fail");

    let order = app.orders.find_by_out_trade_no(&out_trade_no).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Created);
}

#[tokio::test]
async fn test_notification_for_another_app_is_acknowledged() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");
    let out_trade_no = create_order(&app, "100.00").await;

    let fields = app.signed_notification(&[
        ("app_id", "2021000999999999"),
        ("out_trade_no", out_trade_no.as_str()),
        ("total_amount", "100.00"),
        ("trade_no", "2024010122001"),
    ]);

    let (status, ack) = app.post_form("/api/v1/notifications/alipay", &fields).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, "success");

    let order = app.orders.find_by_out_trade_no(&out_trade_no).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Created);
}

#[tokio::test]
async fn test_unsigned_or_garbled_notification() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/notifications/alipay")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("out_trade_no=20240101999&total_amount=1.00"))
        .unwrap();
    let (_, ack) = app.send(request).await;
    assert_eq!(ack, "fail");

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/notifications/alipay")
        .body(Body::empty())
        .unwrap();
    let (_, ack) = app.send(request).await;
    assert_eq!(ack, "fail");
}

#[tokio::test]
async fn test_amount_mismatch_is_acknowledged_but_not_paid() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");
    let out_trade_no = create_order(&app, "100.00").await;

    let fields = app.signed_notification(&[
        ("out_trade_no", out_trade_no.as_str()),
        ("total_amount", "0.01"),
        ("trade_no", "2024010122001"),
    ]);

    let (_, ack) = app.post_form("/api/v1/notifications/alipay", &fields).await;
    assert_eq!(ack, "success");

    let order = app.orders.find_by_out_trade_no(&out_trade_no).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Created);
}

#[tokio::test]
async fn test_concurrent_notifications_transition_once() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");
    let out_trade_no = create_order(&app, "100.00").await;

    let fields = app.signed_notification(&[
        ("out_trade_no", out_trade_no.as_str()),
        ("total_amount", "100.00"),
        ("trade_no", "2024010122001"),
    ]);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = app.state.notification_service.clone();
        let fields = fields.clone();
        handles.push(tokio::spawn(async move { service.handle(&fields).await.unwrap() }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    let paid = outcomes
        .iter()
        .filter(|o| matches!(o, alipay_gateway::services::NotifyOutcome::Paid))
        .count();
    assert_eq!(paid, 1);

    let order = app.orders.find_by_out_trade_no(&out_trade_no).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
}
