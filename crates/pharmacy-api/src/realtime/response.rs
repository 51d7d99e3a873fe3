//! 약국 응답 처리.
//!
//! 약국이 보낸 수락/거절 응답을 받는 확장 지점입니다.
//! 기본 구현은 응답을 기록만 합니다.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use pharmacy_core::PharmacyResponse;

use super::registry::ConnectionId;
use crate::metrics::record_pharmacy_response;

/// 약국 응답 수신자.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// 신원이 확인된 연결에서 받은 응답을 전달합니다.
    async fn deliver(&self, connection_id: &ConnectionId, response: PharmacyResponse);
}

/// 공유 응답 수신자 타입.
pub type SharedResponseSink = Arc<dyn ResponseSink>;

/// 응답을 로그와 메트릭으로만 남기는 기본 수신자.
#[derive(Debug, Default, Clone)]
pub struct LoggingResponseSink;

#[async_trait]
impl ResponseSink for LoggingResponseSink {
    async fn deliver(&self, connection_id: &ConnectionId, response: PharmacyResponse) {
        let decision = response.decision();
        info!(
            connection_id = %connection_id,
            pharmacy_id = %response.pharmacy_id,
            decision = %decision,
            "Pharmacy response received"
        );
        record_pharmacy_response(decision.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmacy_core::PharmacyId;

    #[tokio::test]
    async fn test_logging_sink_accepts_both_decisions() {
        let sink: SharedResponseSink = Arc::new(LoggingResponseSink);
        let conn = ConnectionId::from("c1");
        let id = PharmacyId::new("123").unwrap();

        sink.deliver(&conn, PharmacyResponse::new(id.clone(), true)).await;
        sink.deliver(&conn, PharmacyResponse::new(id, false)).await;
    }
}
