use crate::api::handlers::{notification_handlers, payment_handlers, refund_handlers};
use crate::app_state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // 健康检查
        .route("/health", get(|| async { "OK" }))

        // 支付相关接口
        .route("/api/v1/payments/alipay/app", post(payment_handlers::create_app_payment))
        .route("/api/v1/orders/{out_trade_no}", get(payment_handlers::get_order))

        // 支付宝异步通知
        .route("/api/v1/notifications/alipay", post(notification_handlers::handle_alipay_notification))

        // 退款相关接口
        .route("/api/v1/refunds", post(refund_handlers::create_refund))
        .route("/api/v1/refunds/{out_refund_no}", get(refund_handlers::get_refund))
        .route("/api/v1/refunds/{out_refund_no}/retry", post(refund_handlers::retry_refund))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
