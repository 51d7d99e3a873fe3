//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/notify` - 주문 알림 트리거
//! - `/api/login` - 관리자 로그인
//! - `/api/ping` - 연결 확인

pub mod health;
pub mod login;
pub mod notify;
pub mod ping;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use login::{login_router, LoginFailure, LoginRequest, LoginResponse};
pub use notify::{notify_router, NotifyResponse};
pub use ping::{ping_router, PingResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    let api = Router::new()
        .merge(notify_router())
        .merge(login_router())
        .merge(ping_router());

    Router::new()
        .nest("/health", health_router())
        .nest("/api", api)
}
