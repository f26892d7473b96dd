use crate::adapters::AlipayClient;
use crate::domain::amount::{format_amount, normalize};
use crate::domain::entities::{NewRefund, Refund};
use crate::repositories::RefundRepository;
use crate::utils::error::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// 网关调用失败的原因，退款单保持 REQUESTED
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayFailure {
    pub code: String,
    pub sub_code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct RefundOutcome {
    pub refund: Refund,
    /// None 表示退款已完成
    pub failure: Option<GatewayFailure>,
}

impl RefundOutcome {
    pub fn is_completed(&self) -> bool {
        self.failure.is_none() && self.refund.is_completed()
    }
}

// 退款服务
pub struct RefundService {
    refund_repository: Arc<dyn RefundRepository>,
    alipay: Arc<AlipayClient>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// 提交期间占用 out_refund_no，drop 时释放
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    out_refund_no: String,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<String>>>, out_refund_no: &str) -> AppResult<Self> {
        let mut set = in_flight
            .lock()
            .map_err(|_| AppError::application(ErrorCode::InternalServerError, "in-flight set poisoned"))?;
        if !set.insert(out_refund_no.to_string()) {
            return Err(AppError::conflict(format!(
                "Refund {} is already being submitted",
                out_refund_no
            )));
        }

        Ok(Self {
            in_flight: in_flight.clone(),
            out_refund_no: out_refund_no.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(&self.out_refund_no);
        }
    }
}

impl RefundService {
    pub fn new(refund_repository: Arc<dyn RefundRepository>, alipay: Arc<AlipayClient>) -> Self {
        Self {
            refund_repository,
            alipay,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// 创建退款单并同步调用网关
    pub async fn create_refund(&self, draft: NewRefund) -> AppResult<RefundOutcome> {
        if draft.out_trade_no.trim().is_empty() {
            return Err(AppError::validation("out_trade_no must not be empty"));
        }
        if normalize(draft.refund_amount) <= Decimal::ZERO {
            return Err(AppError::validation("refund_amount must be at least 0.01"));
        }

        let refund = self.refund_repository.insert(draft).await?;
        info!(
            out_refund_no = %refund.out_refund_no,
            out_trade_no = %refund.out_trade_no,
            refund_amount = %format_amount(refund.refund_amount),
            "Created refund"
        );

        self.submit(refund).await
    }

    /// 重新提交仍为 REQUESTED 的退款，out_refund_no 不变
    pub async fn retry_refund(&self, out_refund_no: &str) -> AppResult<RefundOutcome> {
        let refund = self.get_refund(out_refund_no).await?;
        if refund.is_completed() {
            info!(out_refund_no, "Refund already completed, nothing to retry");
            return Ok(RefundOutcome {
                refund,
                failure: None,
            });
        }

        self.submit(refund).await
    }

    pub async fn get_refund(&self, out_refund_no: &str) -> AppResult<Refund> {
        self.refund_repository
            .find_by_out_refund_no(out_refund_no)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Refund {} not found", out_refund_no)))
    }

    async fn submit(&self, refund: Refund) -> AppResult<RefundOutcome> {
        let _guard = InFlightGuard::acquire(&self.in_flight, &refund.out_refund_no)?;

        let response = match self.alipay.trade_refund(&refund).await {
            Ok(response) => response,
            Err(err @ (AppError::Network(_) | AppError::Serialization(_))) => {
                error!(out_refund_no = %refund.out_refund_no, "Alipay refund call failed: {}", err);
                return Ok(RefundOutcome {
                    refund,
                    failure: Some(GatewayFailure {
                        code: err.error_code(),
                        sub_code: None,
                        message: err.user_message(),
                    }),
                });
            }
            Err(err) => return Err(err),
        };

        if !response.is_success() {
            warn!(
                out_refund_no = %refund.out_refund_no,
                code = %response.code,
                sub_code = ?response.sub_code,
                "Alipay refund rejected: {}",
                response.failure_message()
            );
            return Ok(RefundOutcome {
                refund,
                failure: Some(GatewayFailure {
                    code: response.code.clone(),
                    sub_code: response.sub_code.clone(),
                    message: response.failure_message(),
                }),
            });
        }

        // 没有支付宝交易号的成功应答不能作为完成依据
        let Some(trade_no) = response.trade_no.clone().filter(|t| !t.is_empty()) else {
            warn!(
                out_refund_no = %refund.out_refund_no,
                code = %response.code,
                "Alipay refund reply without trade_no"
            );
            return Ok(RefundOutcome {
                refund,
                failure: Some(GatewayFailure {
                    code: ErrorCode::ChannelInvalidResponse.as_u16().to_string(),
                    sub_code: None,
                    message: "Alipay refund reply without trade_no".to_string(),
                }),
            });
        };

        if self
            .refund_repository
            .mark_completed(&refund.out_refund_no, &trade_no)
            .await?
        {
            info!(out_refund_no = %refund.out_refund_no, trade_no = %trade_no, "Refund completed");
        } else {
            info!(out_refund_no = %refund.out_refund_no, "Refund was already completed");
        }

        let refund = self.get_refund(&refund.out_refund_no).await?;
        Ok(RefundOutcome {
            refund,
            failure: None,
        })
    }
}
