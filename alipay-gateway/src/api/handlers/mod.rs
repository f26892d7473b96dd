pub mod notification_handlers;
pub mod payment_handlers;
pub mod refund_handlers;
