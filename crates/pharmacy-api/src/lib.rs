//! 주문 알림 HTTP 트리거 및 WebSocket 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (알림 트리거, 관리자 로그인, ping)
//! - 약국별 실시간 알림을 위한 WebSocket 서버
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`realtime`]: 연결 레지스트리, 세션, 알림 전달
//! - [`server`]: 라우터 조립 및 서버 실행
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod realtime;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use realtime::{
    create_connection_registry, ConnectionId, ConnectionRegistry, LoggingResponseSink,
    NotificationDispatcher, RealtimeState, ResponseSink, SharedRegistry,
};
pub use routes::*;
pub use server::{create_router, serve, RouterOptions};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
