//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use pharmacy_core::{AdminConfig, NotifyError, NotifyRequest, NotifyResult};

use crate::metrics::record_notification;
use crate::realtime::{NotificationDispatcher, SharedRegistry};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 알림 전달기 - 실시간 채널이 준비되기 전에는 None
    pub dispatcher: Option<Arc<NotificationDispatcher>>,

    /// 관리자 자격증명
    pub admin: Arc<AdminConfig>,

    /// `/api/ping` 응답 메시지
    pub ping_message: String,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(admin: AdminConfig, ping_message: impl Into<String>) -> Self {
        Self {
            dispatcher: None,
            admin: Arc::new(admin),
            ping_message: ping_message.into(),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 실시간 채널 연결.
    ///
    /// 트리거 엔드포인트가 레지스트리로 알림을 보낼 수 있게 합니다.
    pub fn with_realtime(mut self, registry: SharedRegistry) -> Self {
        self.dispatcher = Some(Arc::new(NotificationDispatcher::new(registry)));
        self
    }

    /// 실시간 채널 설정 여부 확인.
    pub fn has_realtime(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// 연결 레지스트리 참조.
    pub fn registry(&self) -> Option<&SharedRegistry> {
        self.dispatcher.as_ref().map(|d| d.registry())
    }

    /// 주문 알림 전달.
    ///
    /// 실시간 채널이 없으면 `SubsystemUnavailable`을 반환합니다.
    pub async fn dispatch(&self, request: NotifyRequest) -> NotifyResult<()> {
        let Some(dispatcher) = &self.dispatcher else {
            record_notification("unavailable");
            return Err(NotifyError::subsystem_unavailable());
        };
        dispatcher.dispatch(request).await
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 실시간 채널 없이 기본 관리자 설정(`admin` / `1234`)만 포함합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    AppState::new(AdminConfig::default(), "ping")
}
