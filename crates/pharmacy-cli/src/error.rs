//! 클라이언트 에러 타입.

use thiserror::Error;

use pharmacy_core::ProtocolError;

/// 리스너/트리거 클라이언트 에러.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("WebSocket 에러: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("프로토콜 에러: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("HTTP 요청 실패: {0}")]
    Http(#[from] reqwest::Error),

    /// 서버가 요청을 거부함 (4xx/5xx)
    #[error("서버 거부 ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("재연결 시도 횟수 초과 ({attempts}회)")]
    ReconnectExhausted { attempts: u32 },

    #[error("잘못된 서버 주소: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// 재연결로 복구 가능한 에러인지 확인.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::WebSocket(_))
    }
}

/// 클라이언트 Result 타입.
pub type ClientResult<T> = Result<T, ClientError>;
