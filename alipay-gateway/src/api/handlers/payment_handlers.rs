use crate::api::models::{AppPaymentResponse, CreateAppPaymentRequest, OrderResponse};
use crate::app_state::AppState;
use crate::domain::entities::NewOrder;
use crate::utils::error::{ApiResponse, AppResult};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tracing::info;

// 创建APP支付
pub async fn create_app_payment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateAppPaymentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AppPaymentResponse>>)> {
    info!("API: Create Alipay app payment, subject: {}", payload.subject);

    let payment = state
        .payment_service
        .create_app_payment(NewOrder {
            subject: payload.subject,
            total_amount: payload.total_amount,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AppPaymentResponse::from(payment))),
    ))
}

// 查询订单
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(out_trade_no): Path<String>,
) -> AppResult<Json<ApiResponse<OrderResponse>>> {
    let order = state.payment_service.get_order(&out_trade_no).await?;
    Ok(Json(ApiResponse::success(OrderResponse::from(order))))
}
