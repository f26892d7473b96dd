mod common;

use alipay_gateway::domain::enums::RefundStatus;
use alipay_gateway::repositories::RefundRepository;
use axum::http::StatusCode;
use common::spawn_app;
use httpmock::prelude::*;
use serde_json::json;

#[tokio::test]
async fn test_refund_completed_by_gateway() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/gateway.do")
            .query_param("method", "alipay.trade.refund")
            .query_param("sign_type", "RSA2")
            .query_param_exists("sign");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({
                "alipay_trade_refund_response": {
                    "code": "10000",
                    "msg": "Success",
                    "trade_no": "2024010112345",
                    "out_trade_no": "2024010142",
                    "refund_fee": "88.88",
                    "fund_change": "Y"
                },
                "sign": "ERITJKEIJKJHKKKKKKKHJEREEEEEEEEEEE"
            }));
    });

    let app = spawn_app(&format!("{}?{{payload}}", server.url("/gateway.do")));
    let (status, body) = app
        .post_json(
            "/api/v1/refunds",
            json!({"out_trade_no": "2024010142", "refund_amount": "88.88", "refund_reason": "用户申请退款"}),
        )
        .await;

    mock.assert();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert_eq!(body["data"]["trade_no"], "2024010112345");
    assert_eq!(body["data"]["refund_amount"], "88.88");

    let out_refund_no = body["data"]["out_refund_no"].as_str().unwrap().to_string();
    let stored = app.refunds.find_by_out_refund_no(&out_refund_no).await.unwrap().unwrap();
    assert_eq!(stored.status, RefundStatus::Completed);

    let (status, queried) = app.get_json(&format!("/api/v1/refunds/{}", out_refund_no)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queried["data"]["status"], "COMPLETED");
}

#[tokio::test]
async fn test_rejected_refund_stays_requested_and_can_be_retried() {
    let server = MockServer::start();
    let mut rejected = server.mock(|when, then| {
        when.method(GET).path("/gateway.do");
        then.status(200).json_body(json!({
            "alipay_trade_refund_response": {
                "code": "40004",
                "msg": "Business Failed",
                "sub_code": "ACQ.SYSTEM_ERROR",
                "sub_msg": "系统错误"
            }
        }));
    });

    let app = spawn_app(&server.url("/gateway.do"));
    let (status, body) = app
        .post_json("/api/v1/refunds", json!({"out_trade_no": "2024010142", "refund_amount": 10}))
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "系统错误");
    assert_eq!(body["data"]["status"], "REQUESTED");
    assert_eq!(body["data"]["failure"]["sub_code"], "ACQ.SYSTEM_ERROR");

    let out_refund_no = body["data"]["out_refund_no"].as_str().unwrap().to_string();
    rejected.delete();

    let accepted = server.mock(|when, then| {
        when.method(GET).path("/gateway.do");
        then.status(200).json_body(json!({
            "alipay_trade_refund_response": {"code": "10000", "msg": "Success", "trade_no": "2024010112345"}
        }));
    });

    let (status, body) = app
        .post_json(&format!("/api/v1/refunds/{}/retry", out_refund_no), json!({}))
        .await;
    accepted.assert();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert_eq!(body["data"]["out_refund_no"], out_refund_no.as_str());
}

#[tokio::test]
async fn test_unreachable_gateway_keeps_refund_requested() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/gateway.do");
        then.status(503);
    });

    let app = spawn_app(&server.url("/gateway.do"));
    let (status, body) = app
        .post_json("/api/v1/refunds", json!({"out_trade_no": "2024010142", "refund_amount": "1.00"}))
        .await;

    mock.assert_hits(1);
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"]["status"], "REQUESTED");
}

#[tokio::test]
async fn test_invalid_refund_request() {
    let app = spawn_app("http://127.0.0.1:9/gateway.do");
    let (status, body) = app
        .post_json("/api/v1/refunds", json!({"out_trade_no": "2024010142", "refund_amount": "0"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app.get_json("/api/v1/refunds/alipay-refund2024010199").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
