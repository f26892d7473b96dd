use super::{OrderRepository, RefundRepository};
use crate::domain::entities::{NewOrder, NewRefund, Order, Refund};
use crate::utils::error::AppResult;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// 内存订单存储，以 out_trade_no 为键
///
/// 条件更新在写锁内完成，并发通知只会有一个成功。
#[derive(Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<String, Order>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, draft: NewOrder) -> AppResult<Order> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let order = Order::new(id, draft, Utc::now());

        let mut orders = self.orders.write().await;
        orders.insert(order.out_trade_no.clone(), order.clone());
        Ok(order)
    }

    async fn find_by_out_trade_no(&self, out_trade_no: &str) -> AppResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(out_trade_no).cloned())
    }

    async fn mark_paid(&self, out_trade_no: &str, trade_no: &str) -> AppResult<bool> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(out_trade_no) {
            Some(order) if !order.is_paid() => {
                order.mark_paid(trade_no, Utc::now())?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// 内存退款存储，以 out_refund_no 为键
#[derive(Default, Clone)]
pub struct InMemoryRefundRepository {
    refunds: Arc<RwLock<HashMap<String, Refund>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryRefundRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefundRepository for InMemoryRefundRepository {
    async fn insert(&self, draft: NewRefund) -> AppResult<Refund> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let refund = Refund::new(id, draft, Utc::now());

        let mut refunds = self.refunds.write().await;
        refunds.insert(refund.out_refund_no.clone(), refund.clone());
        Ok(refund)
    }

    async fn find_by_out_refund_no(&self, out_refund_no: &str) -> AppResult<Option<Refund>> {
        let refunds = self.refunds.read().await;
        Ok(refunds.get(out_refund_no).cloned())
    }

    async fn mark_completed(&self, out_refund_no: &str, trade_no: &str) -> AppResult<bool> {
        let mut refunds = self.refunds.write().await;
        match refunds.get_mut(out_refund_no) {
            Some(refund) if !refund.is_completed() => {
                refund.mark_completed(trade_no, Utc::now())?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
