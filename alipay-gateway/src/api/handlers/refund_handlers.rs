use crate::api::models::{CreateRefundRequest, RefundResponse};
use crate::app_state::AppState;
use crate::domain::entities::NewRefund;
use crate::services::RefundOutcome;
use crate::utils::error::{ApiResponse, AppResult, ErrorCode};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tracing::info;

// 网关未确认的退款返回 202，退款单仍可重试
fn refund_reply(outcome: RefundOutcome) -> (StatusCode, Json<ApiResponse<RefundResponse>>) {
    match outcome.failure.clone() {
        None => (
            StatusCode::OK,
            Json(ApiResponse::success(RefundResponse::new(outcome.refund, None))),
        ),
        Some(failure) => {
            let message = failure.message.clone();
            (
                StatusCode::ACCEPTED,
                Json(ApiResponse::pending(
                    &ErrorCode::RefundFailed.as_u16().to_string(),
                    &message,
                    RefundResponse::new(outcome.refund, Some(failure)),
                )),
            )
        }
    }
}

// 创建退款
pub async fn create_refund(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRefundRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RefundResponse>>)> {
    info!("API: Create refund request received for order: {}", payload.out_trade_no);

    let outcome = state
        .refund_service
        .create_refund(NewRefund {
            out_trade_no: payload.out_trade_no,
            refund_amount: payload.refund_amount,
            refund_reason: payload.refund_reason,
        })
        .await?;

    Ok(refund_reply(outcome))
}

// 重新提交退款
pub async fn retry_refund(
    State(state): State<Arc<AppState>>,
    Path(out_refund_no): Path<String>,
) -> AppResult<(StatusCode, Json<ApiResponse<RefundResponse>>)> {
    info!("API: Retry refund {}", out_refund_no);

    let outcome = state.refund_service.retry_refund(&out_refund_no).await?;
    Ok(refund_reply(outcome))
}

// 查询退款
pub async fn get_refund(
    State(state): State<Arc<AppState>>,
    Path(out_refund_no): Path<String>,
) -> AppResult<Json<ApiResponse<RefundResponse>>> {
    let refund = state.refund_service.get_refund(&out_refund_no).await?;
    Ok(Json(ApiResponse::success(RefundResponse::new(refund, None))))
}
