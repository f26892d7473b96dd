pub mod alipay;

pub use alipay::{AlipayClient, SignedRequest};
