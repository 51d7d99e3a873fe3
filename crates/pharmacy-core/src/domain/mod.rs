//! 주문 알림을 위한 도메인 모델.

mod order;
mod pharmacy;
mod response;

pub use order::*;
pub use pharmacy::*;
pub use response::*;
