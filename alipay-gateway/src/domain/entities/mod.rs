mod order;
mod refund;

pub use order::{NewOrder, Order};
pub use refund::{NewRefund, Refund};
