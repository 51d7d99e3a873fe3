//! 알림 시스템의 에러 타입.
//!
//! 트리거 엔드포인트까지 전파되는 에러만 정의합니다.
//! 빈 room으로의 브로드캐스트는 정상 결과이므로 여기에 포함되지 않습니다.

use thiserror::Error;

/// 알림 디스패치 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// 요청 필드 누락 또는 형식 오류 (재시도 대상 아님)
    #[error("{0}")]
    Validation(String),

    /// 실시간 계층이 초기화되지 않음
    #[error("{0}")]
    SubsystemUnavailable(String),
}

impl NotifyError {
    /// 검증 에러를 생성합니다.
    pub fn validation(message: impl Into<String>) -> Self {
        NotifyError::Validation(message.into())
    }

    /// 필수 필드 누락 에러.
    pub fn missing_fields() -> Self {
        NotifyError::Validation(MISSING_FIELDS_MESSAGE.to_string())
    }

    /// 실시간 계층 미초기화 에러.
    pub fn subsystem_unavailable() -> Self {
        NotifyError::SubsystemUnavailable("Realtime subsystem not initialized".to_string())
    }

    /// 호출자 입력 문제로 발생한 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(self, NotifyError::Validation(_))
    }
}

/// 필수 필드 누락 시 반환되는 메시지.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: pharmacy_id, drugs, total";

/// 알림 시스템 Result 타입.
pub type NotifyResult<T> = Result<T, NotifyError>;
