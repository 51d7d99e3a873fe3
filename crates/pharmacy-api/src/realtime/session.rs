//! 연결 세션 상태 머신.
//!
//! 연결 하나의 수명을 관리합니다.
//!
//! ```text
//! Unidentified --pharmacy_login--> Identified(id) --pharmacy_login--> Identified(id')
//!       |                               |
//!       +---------- 연결 종료 ----------+--> Terminated
//! ```
//!
//! `Terminated`는 최종 상태이며, 이후 모든 프레임은 무시됩니다.

use tracing::{debug, info, warn};

use pharmacy_core::{ClientEvent, PharmacyId, PharmacyResponse, ServerEvent};

use super::registry::{ConnectionId, EventReceiver, SharedRegistry};
use super::response::SharedResponseSink;
use crate::metrics::record_pharmacy_login;

/// 세션 상태.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// 신원 미선언
    Unidentified,
    /// 신원 선언 완료
    Identified(PharmacyId),
    /// 종료됨
    Terminated,
}

/// 연결 세션.
pub struct Session {
    id: ConnectionId,
    state: SessionState,
    registry: SharedRegistry,
    responses: SharedResponseSink,
}

impl Session {
    /// 연결을 레지스트리에 등록하고 세션을 엽니다.
    ///
    /// 이 연결로 보낼 이벤트의 수신 채널을 함께 반환합니다.
    pub async fn open(
        id: ConnectionId,
        registry: SharedRegistry,
        responses: SharedResponseSink,
    ) -> (Self, EventReceiver) {
        let events = registry.register(id.clone()).await;
        let session = Self {
            id,
            state: SessionState::Unidentified,
            registry,
            responses,
        };
        (session, events)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// 텍스트 프레임 처리.
    ///
    /// # Returns
    ///
    /// `true`면 연결 유지, `false`면 연결 종료
    pub async fn handle_text(&mut self, text: &str) -> bool {
        if self.state == SessionState::Terminated {
            return false;
        }

        match ClientEvent::from_json(text) {
            Ok(event) => self.handle_event(event).await,
            Err(e) if e.is_malformed_login() => {
                warn!(connection_id = %self.id, error = %e, "Malformed pharmacy_login, closing connection");
                false
            }
            Err(e) => {
                warn!(connection_id = %self.id, error = %e, "Ignoring invalid frame");
                true
            }
        }
    }

    /// 파싱된 클라이언트 이벤트 처리.
    pub async fn handle_event(&mut self, event: ClientEvent) -> bool {
        debug!(connection_id = %self.id, event = event.name(), "Client event received");

        match event {
            ClientEvent::PharmacyLogin { pharmacy_id } => self.identify(pharmacy_id).await,
            ClientEvent::Response(response) => {
                self.respond(response).await;
                true
            }
        }
    }

    async fn identify(&mut self, pharmacy_id: PharmacyId) -> bool {
        if !self.registry.associate(&self.id, pharmacy_id.clone()).await {
            warn!(connection_id = %self.id, "Connection no longer registered");
            return false;
        }

        match &self.state {
            SessionState::Identified(previous) if previous != &pharmacy_id => {
                info!(
                    connection_id = %self.id,
                    from = %previous,
                    to = %pharmacy_id,
                    "Pharmacy identity changed"
                );
            }
            _ => {
                info!(connection_id = %self.id, pharmacy_id = %pharmacy_id, "Pharmacy logged in");
            }
        }
        record_pharmacy_login();

        let ack = ServerEvent::LoginSuccess {
            pharmacy_id: pharmacy_id.clone(),
        };
        self.state = SessionState::Identified(pharmacy_id);
        self.registry.send_to(&self.id, ack).await
    }

    async fn respond(&self, response: PharmacyResponse) {
        match &self.state {
            SessionState::Identified(current) => {
                if current != &response.pharmacy_id {
                    warn!(
                        connection_id = %self.id,
                        session_pharmacy = %current,
                        response_pharmacy = %response.pharmacy_id,
                        "Response pharmacy_id differs from session identity"
                    );
                }
                self.responses.deliver(&self.id, response).await;
            }
            SessionState::Unidentified => {
                warn!(connection_id = %self.id, "Response before pharmacy_login, ignored");
            }
            SessionState::Terminated => {}
        }
    }

    /// 세션 종료.
    ///
    /// 레지스트리에서 연결을 제거합니다. 여러 번 호출해도 안전합니다.
    pub async fn terminate(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }

        let pharmacy_id = self.registry.unregister(&self.id).await;
        self.state = SessionState::Terminated;

        match pharmacy_id {
            Some(pharmacy_id) => {
                info!(connection_id = %self.id, pharmacy_id = %pharmacy_id, "Pharmacy disconnected")
            }
            None => debug!(connection_id = %self.id, "Unidentified connection closed"),
        }
    }
}
