pub mod notification_service;
pub mod payment_service;
pub mod refund_service;

pub use notification_service::{NotificationService, NotifyOutcome};
pub use payment_service::{AppPayment, PaymentService};
pub use refund_service::{GatewayFailure, RefundOutcome, RefundService};
