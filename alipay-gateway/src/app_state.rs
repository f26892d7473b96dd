use crate::adapters::AlipayClient;
use crate::config::AppConfig;
use crate::repositories::{OrderRepository, RefundRepository};
use crate::services::{NotificationService, PaymentService, RefundService};
use crate::utils::error::AppResult;
use crate::utils::http_client::{HttpClient, HttpClientConfig};
use std::sync::Arc;

/// 应用状态，包含共享资源和服务
pub struct AppState {
    // 服务层
    pub payment_service: Arc<PaymentService>,
    pub notification_service: Arc<NotificationService>,
    pub refund_service: Arc<RefundService>,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        order_repository: Arc<dyn OrderRepository>,
        refund_repository: Arc<dyn RefundRepository>,
    ) -> AppResult<Self> {
        // 初始化支付宝客户端
        let http = HttpClient::new(HttpClientConfig::from(&config.http))?;
        let alipay = Arc::new(AlipayClient::new(config.alipay.clone(), http)?);

        // 初始化服务
        let payment_service = Arc::new(PaymentService::new(order_repository.clone(), alipay.clone()));
        let notification_service = Arc::new(NotificationService::new(order_repository, alipay.clone()));
        let refund_service = Arc::new(RefundService::new(refund_repository, alipay));

        Ok(Self {
            payment_service,
            notification_service,
            refund_service,
        })
    }
}
