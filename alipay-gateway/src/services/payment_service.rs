use crate::adapters::AlipayClient;
use crate::domain::amount::{format_amount, normalize};
use crate::domain::entities::{NewOrder, Order};
use crate::repositories::OrderRepository;
use crate::utils::error::{AppError, AppResult};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// 下单结果：订单以及交给客户端 SDK 的 orderString
#[derive(Debug, Clone)]
pub struct AppPayment {
    pub order: Order,
    pub order_string: String,
}

// 支付服务
pub struct PaymentService {
    order_repository: Arc<dyn OrderRepository>,
    alipay: Arc<AlipayClient>,
}

impl PaymentService {
    pub fn new(order_repository: Arc<dyn OrderRepository>, alipay: Arc<AlipayClient>) -> Self {
        Self {
            order_repository,
            alipay,
        }
    }

    /// 创建订单并生成签名后的 APP 支付请求串
    pub async fn create_app_payment(&self, draft: NewOrder) -> AppResult<AppPayment> {
        if draft.subject.trim().is_empty() {
            return Err(AppError::validation("subject must not be empty"));
        }
        if normalize(draft.total_amount) <= Decimal::ZERO {
            return Err(AppError::validation("total_amount must be at least 0.01"));
        }

        // 先落库拿到 out_trade_no，再签名
        let order = self.order_repository.insert(draft).await?;
        let signed = self.alipay.app_pay_order_string(&order)?;

        info!(
            out_trade_no = %order.out_trade_no,
            total_amount = %format_amount(order.total_amount),
            "Created Alipay app payment"
        );

        Ok(AppPayment {
            order,
            order_string: signed.encoded,
        })
    }

    pub async fn get_order(&self, out_trade_no: &str) -> AppResult<Order> {
        self.order_repository
            .find_by_out_trade_no(out_trade_no)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", out_trade_no)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::enums::OrderStatus;
    use crate::repositories::InMemoryOrderRepository;
    use crate::utils::http_client::{HttpClient, HttpClientConfig};
    use openssl::rsa::Rsa;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn service() -> PaymentService {
        let merchant = Rsa::generate(2048).unwrap();
        let gateway = Rsa::generate(2048).unwrap();

        let mut config = AppConfig::default().alipay;
        config.app_id = "2021000123456789".to_string();
        config.private_key = String::from_utf8(merchant.private_key_to_pem().unwrap()).unwrap();
        config.alipay_public_key = String::from_utf8(gateway.public_key_to_pem().unwrap()).unwrap();

        let http = HttpClient::new(HttpClientConfig::default()).unwrap();
        let alipay = Arc::new(AlipayClient::new(config, http).unwrap());
        PaymentService::new(Arc::new(InMemoryOrderRepository::new()), alipay)
    }

    #[tokio::test]
    async fn test_create_app_payment() {
        let service = service();
        let payment = service
            .create_app_payment(NewOrder {
                subject: "年度会员".to_string(),
                total_amount: dec!(19.9),
            })
            .await
            .unwrap();

        assert_eq!(payment.order.status, OrderStatus::Created);
        assert!(payment.order_string.contains("method=alipay.trade.app.pay"));
        assert!(payment.order_string.contains("&sign="));

        let stored = service.get_order(&payment.order.out_trade_no).await.unwrap();
        assert_eq!(stored, payment.order);
    }

    #[rstest]
    #[case("", dec!(10))]
    #[case("  ", dec!(10))]
    #[case("会员", dec!(0))]
    #[case("会员", dec!(0.004))]
    #[case("会员", dec!(-1))]
    #[tokio::test]
    async fn test_invalid_payment_requests(#[case] subject: &str, #[case] total_amount: Decimal) {
        let result = service()
            .create_app_payment(NewOrder {
                subject: subject.to_string(),
                total_amount,
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let result = service().get_order("20240101999").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
