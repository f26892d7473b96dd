use super::{OrderRepository, RefundRepository};
use crate::domain::entities::{NewOrder, NewRefund, Order, Refund};
use crate::domain::enums::{OrderStatus, RefundStatus};
use crate::utils::error::{AppError, AppResult};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlPool;

#[derive(Debug, sqlx::FromRow)]
struct OrderRecord {
    id: u64,
    out_trade_no: Option<String>,
    subject: String,
    total_amount: Decimal,
    status: i8,
    trade_no: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = AppError;

    fn try_from(r: OrderRecord) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_db(r.status)
            .ok_or_else(|| AppError::internal_server(anyhow!("unknown order status {}", r.status)))?;

        Ok(Order {
            out_trade_no: r
                .out_trade_no
                .unwrap_or_else(|| Order::out_trade_no_for(r.id, r.created_at)),
            id: r.id,
            subject: r.subject,
            total_amount: r.total_amount,
            status,
            trade_no: r.trade_no,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub struct MySqlOrderRepository {
    db_pool: MySqlPool,
}

impl MySqlOrderRepository {
    pub fn new(db_pool: MySqlPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrderRepository for MySqlOrderRepository {
    async fn insert(&self, draft: NewOrder) -> AppResult<Order> {
        let now = Utc::now();
        let mut tx = self.db_pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO alipay_orders (subject, total_amount, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
            .bind(&draft.subject)
            .bind(draft.total_amount)
            .bind(OrderStatus::Created.as_db())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        // 商户订单号依赖自增 id，在同一事务内回填
        let order = Order::new(result.last_insert_id(), draft, now);

        sqlx::query("UPDATE alipay_orders SET out_trade_no = ? WHERE id = ?")
            .bind(&order.out_trade_no)
            .bind(order.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(order)
    }

    async fn find_by_out_trade_no(&self, out_trade_no: &str) -> AppResult<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, out_trade_no, subject, total_amount, status, trade_no, created_at, updated_at
            FROM alipay_orders
            WHERE out_trade_no = ?
            "#,
        )
            .bind(out_trade_no)
            .fetch_optional(&self.db_pool)
            .await?;

        record.map(Order::try_from).transpose()
    }

    async fn mark_paid(&self, out_trade_no: &str, trade_no: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE alipay_orders
            SET status = ?, trade_no = ?, updated_at = ?
            WHERE out_trade_no = ? AND status = ?
            "#,
        )
            .bind(OrderStatus::Paid.as_db())
            .bind(trade_no)
            .bind(Utc::now())
            .bind(out_trade_no)
            .bind(OrderStatus::Created.as_db())
            .execute(&self.db_pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RefundRecord {
    id: u64,
    out_refund_no: Option<String>,
    out_trade_no: String,
    refund_amount: Decimal,
    refund_reason: Option<String>,
    status: i8,
    trade_no: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RefundRecord> for Refund {
    type Error = AppError;

    fn try_from(r: RefundRecord) -> Result<Self, Self::Error> {
        let status = RefundStatus::from_db(r.status)
            .ok_or_else(|| AppError::internal_server(anyhow!("unknown refund status {}", r.status)))?;

        Ok(Refund {
            out_refund_no: r
                .out_refund_no
                .unwrap_or_else(|| Refund::out_refund_no_for(r.id, r.created_at)),
            id: r.id,
            out_trade_no: r.out_trade_no,
            refund_amount: r.refund_amount,
            refund_reason: r.refund_reason,
            status,
            trade_no: r.trade_no,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub struct MySqlRefundRepository {
    db_pool: MySqlPool,
}

impl MySqlRefundRepository {
    pub fn new(db_pool: MySqlPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RefundRepository for MySqlRefundRepository {
    async fn insert(&self, draft: NewRefund) -> AppResult<Refund> {
        let now = Utc::now();
        let mut tx = self.db_pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO alipay_refunds (out_trade_no, refund_amount, refund_reason, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
            .bind(&draft.out_trade_no)
            .bind(draft.refund_amount)
            .bind(&draft.refund_reason)
            .bind(RefundStatus::Requested.as_db())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let refund = Refund::new(result.last_insert_id(), draft, now);

        sqlx::query("UPDATE alipay_refunds SET out_refund_no = ? WHERE id = ?")
            .bind(&refund.out_refund_no)
            .bind(refund.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(refund)
    }

    async fn find_by_out_refund_no(&self, out_refund_no: &str) -> AppResult<Option<Refund>> {
        let record = sqlx::query_as::<_, RefundRecord>(
            r#"
            SELECT id, out_refund_no, out_trade_no, refund_amount, refund_reason, status,
                   trade_no, created_at, updated_at
            FROM alipay_refunds
            WHERE out_refund_no = ?
            "#,
        )
            .bind(out_refund_no)
            .fetch_optional(&self.db_pool)
            .await?;

        record.map(Refund::try_from).transpose()
    }

    async fn mark_completed(&self, out_refund_no: &str, trade_no: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE alipay_refunds
            SET status = ?, trade_no = ?, updated_at = ?
            WHERE out_refund_no = ? AND status = ?
            "#,
        )
            .bind(RefundStatus::Completed.as_db())
            .bind(trade_no)
            .bind(Utc::now())
            .bind(out_refund_no)
            .bind(RefundStatus::Requested.as_db())
            .execute(&self.db_pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
