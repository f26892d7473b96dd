use crate::app_state::AppState;
use crate::services::notification_service::ACK_FAIL;
use axum::body::Bytes;
use axum::extract::State;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

// 处理支付宝异步通知，应答为纯文本 success / fail
pub async fn handle_alipay_notification(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> &'static str {
    info!("Received Alipay payment notification");

    let fields: HashMap<String, String> = match serde_urlencoded::from_bytes::<Vec<(String, String)>>(&body) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(e) => {
            warn!("Invalid Alipay notification body: {}", e);
            return ACK_FAIL;
        }
    };

    match state.notification_service.handle(&fields).await {
        Ok(outcome) => {
            let ack = state.notification_service.ack_for(&outcome);
            info!(outcome = ?outcome, ack, "Alipay notification processed");
            ack
        }
        Err(e) => {
            error!("Failed to process Alipay notification: {}", e);
            ACK_FAIL
        }
    }
}
