use crate::domain::entities::{NewOrder, NewRefund, Order, Refund};
use crate::utils::error::AppResult;
use async_trait::async_trait;

mod memory;
mod mysql;

pub use memory::{InMemoryOrderRepository, InMemoryRefundRepository};
pub use mysql::{MySqlOrderRepository, MySqlRefundRepository};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// 写入新订单，分配 id 和 out_trade_no
    async fn insert(&self, draft: NewOrder) -> AppResult<Order>;

    async fn find_by_out_trade_no(&self, out_trade_no: &str) -> AppResult<Option<Order>>;

    /// 条件更新：仅当订单仍为 CREATED 时置为 PAID 并写入 trade_no。
    /// 返回是否发生了转换。
    async fn mark_paid(&self, out_trade_no: &str, trade_no: &str) -> AppResult<bool>;
}

#[async_trait]
pub trait RefundRepository: Send + Sync {
    /// 写入新退款单，分配 id 和 out_refund_no
    async fn insert(&self, draft: NewRefund) -> AppResult<Refund>;

    async fn find_by_out_refund_no(&self, out_refund_no: &str) -> AppResult<Option<Refund>>;

    /// 条件更新：仅当退款仍为 REQUESTED 时置为 COMPLETED。
    async fn mark_completed(&self, out_refund_no: &str, trade_no: &str) -> AppResult<bool>;
}
