//! 주문 알림 전달.
//!
//! HTTP 트리거에서 받은 요청을 검증하고 해당 약국 room으로 `incoming_call`을 보냅니다.

use tracing::info;

use pharmacy_core::{NotifyRequest, NotifyResult, OrderNotification, ServerEvent};

use super::registry::SharedRegistry;
use crate::metrics::record_notification;

/// 알림 전달기.
pub struct NotificationDispatcher {
    registry: SharedRegistry,
}

impl NotificationDispatcher {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// 연결 레지스트리 참조.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// 요청을 검증한 뒤 전달합니다.
    ///
    /// 연결된 약국이 없어도 성공으로 처리합니다.
    pub async fn dispatch(&self, request: NotifyRequest) -> NotifyResult<()> {
        let notification = request.into_notification().inspect_err(|_| {
            record_notification("invalid");
        })?;

        self.dispatch_notification(notification).await;
        Ok(())
    }

    /// 검증이 끝난 알림을 약국 room으로 전달합니다.
    pub async fn dispatch_notification(&self, notification: OrderNotification) {
        let pharmacy_id = notification.pharmacy_id.clone();
        let drug_count = notification.drugs.len();
        let total = notification.total;

        self.registry
            .broadcast(&pharmacy_id, ServerEvent::IncomingCall(notification))
            .await;

        record_notification("dispatched");
        info!(
            pharmacy_id = %pharmacy_id,
            drugs = drug_count,
            total,
            "Order notification dispatched"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::registry::{create_connection_registry, ConnectionId};
    use pharmacy_core::{NotifyError, PharmacyId};

    fn pid(id: &str) -> PharmacyId {
        PharmacyId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_reaches_room() {
        let registry = create_connection_registry();
        let conn = ConnectionId::from("c1");
        let mut rx = registry.register(conn.clone()).await;
        registry.associate(&conn, pid("123")).await;

        let dispatcher = NotificationDispatcher::new(registry);
        let request = NotifyRequest::new(
            "123",
            vec!["Aspirin".to_string(), "Ibuprofen".to_string()],
            23000i64,
        );
        dispatcher.dispatch(request).await.unwrap();

        match rx.try_recv().unwrap() {
            ServerEvent::IncomingCall(call) => {
                assert_eq!(call.pharmacy_id, pid("123"));
                assert_eq!(call.drugs, vec!["Aspirin", "Ibuprofen"]);
                assert_eq!(call.total, 23000);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_without_listeners_succeeds() {
        let dispatcher = NotificationDispatcher::new(create_connection_registry());
        let request = NotifyRequest::new("999", vec!["X".to_string()], 100i64);
        assert!(dispatcher.dispatch(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_rejects_missing_fields() {
        let registry = create_connection_registry();
        let conn = ConnectionId::from("c1");
        let mut rx = registry.register(conn.clone()).await;
        registry.associate(&conn, pid("123")).await;

        let dispatcher = NotificationDispatcher::new(registry);
        let request = NotifyRequest {
            pharmacy_id: Some("123".to_string()),
            drugs: None,
            total: Some(1i64.into()),
        };

        let err = dispatcher.dispatch(request).await.unwrap_err();
        assert_eq!(err, NotifyError::missing_fields());
        assert!(rx.try_recv().is_err());
    }
}
