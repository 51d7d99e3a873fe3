//! 약국 알림 클라이언트 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 자동 재연결 약국 리스너
//! - 주문 알림 트리거 클라이언트

pub mod backoff;
pub mod error;
pub mod listener;
pub mod trigger;

pub use backoff::ReconnectPolicy;
pub use error::{ClientError, ClientResult};
pub use listener::{websocket_url, PharmacyListener};
pub use trigger::{NotifyAck, TriggerClient};
