//! 실시간 채널 메시지 타입.
//!
//! 클라이언트-서버 간 교환되는 이벤트 정의.
//! 모든 프레임은 JSON 텍스트 `{"event": <이름>, "data": <페이로드>}` 형식입니다.
//!
//! ## 클라이언트 → 서버
//!
//! ```json
//! {"event": "pharmacy_login", "data": {"pharmacy_id": "123"}}
//! {"event": "response", "data": {"pharmacy_id": "123", "accepted": true}}
//! ```
//!
//! ## 서버 → 클라이언트
//!
//! ```json
//! {"event": "login_success", "data": {"pharmacy_id": "123"}}
//! {"event": "incoming_call", "data": {"pharmacy_id": "123", "drugs": ["Aspirin"], "total": 23000}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{OrderNotification, PharmacyId, PharmacyResponse};

/// 신원 선언 이벤트 이름.
pub const PHARMACY_LOGIN: &str = "pharmacy_login";
/// 응답 이벤트 이름.
pub const RESPONSE: &str = "response";

/// 프로토콜 에러.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("잘못된 메시지 형식: {0}")]
    InvalidMessage(String),
    #[error("알 수 없는 이벤트: {0}")]
    UnknownEvent(String),
    #[error("잘못된 {event} 페이로드: {reason}")]
    InvalidPayload { event: String, reason: String },
    #[error("직렬화 실패: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProtocolError {
    /// 신원 선언 이벤트의 페이로드가 잘못되었는지 확인.
    pub fn is_malformed_login(&self) -> bool {
        matches!(self, ProtocolError::InvalidPayload { event, .. } if event == PHARMACY_LOGIN)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    pharmacy_id: PharmacyId,
}

// ==================== 클라이언트 → 서버 이벤트 ====================

/// 클라이언트에서 서버로 보내는 이벤트.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// 약국 신원 선언
    PharmacyLogin {
        /// 선언할 약국 ID
        pharmacy_id: PharmacyId,
    },
    /// 주문 수락/거절 응답
    Response(PharmacyResponse),
}

impl ClientEvent {
    /// JSON 문자열에서 파싱.
    ///
    /// 봉투 파싱 실패, 알 수 없는 이벤트, 페이로드 오류를 구분하여 반환합니다.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(json)
            .map_err(|e| ProtocolError::InvalidMessage(e.to_string()))?;

        match envelope.event.as_str() {
            PHARMACY_LOGIN => {
                let payload: LoginPayload = serde_json::from_value(envelope.data)
                    .map_err(|e| invalid_payload(PHARMACY_LOGIN, e))?;
                Ok(ClientEvent::PharmacyLogin {
                    pharmacy_id: payload.pharmacy_id,
                })
            }
            RESPONSE => {
                let response: PharmacyResponse = serde_json::from_value(envelope.data)
                    .map_err(|e| invalid_payload(RESPONSE, e))?;
                Ok(ClientEvent::Response(response))
            }
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }

    /// JSON 문자열로 직렬화.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::from)
    }

    /// 이벤트 이름 (로그용).
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::PharmacyLogin { .. } => PHARMACY_LOGIN,
            ClientEvent::Response(_) => RESPONSE,
        }
    }
}

fn invalid_payload(event: &str, err: serde_json::Error) -> ProtocolError {
    ProtocolError::InvalidPayload {
        event: event.to_string(),
        reason: err.to_string(),
    }
}

// ==================== 서버 → 클라이언트 이벤트 ====================

/// 서버에서 클라이언트로 보내는 이벤트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// 신원 선언 확인 (해당 연결에만 전송)
    LoginSuccess {
        /// 할당된 약국 ID
        pharmacy_id: PharmacyId,
    },
    /// 주문 알림
    IncomingCall(OrderNotification),
}

impl ServerEvent {
    /// JSON 문자열로 직렬화.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::from)
    }

    /// JSON 문자열에서 파싱.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(|e| ProtocolError::InvalidMessage(e.to_string()))
    }
}
