//! # Pharmacy Core
//!
//! 약국 주문 알림 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 알림 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 약국 식별자
//! - 주문 알림 요청 검증 및 정규화
//! - 약국 응답(수락/거절)
//! - 실시간 채널 이벤트 프로토콜
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod protocol;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use protocol::{ClientEvent, ProtocolError, ServerEvent};
