//! 연결 레지스트리.
//!
//! 활성 연결과 약국 신원 매핑, 그리고 약국별 room을 관리합니다.
//! room은 같은 약국 신원을 선언한 연결들의 집합이며, 비어 있는 room은 즉시 제거됩니다.
//!
//! 브로드캐스트는 읽기 잠금, 연결/신원 변경은 쓰기 잠금으로 직렬화되므로
//! 브로드캐스트는 신원 변경 이전 또는 이후의 멤버십 중 하나만 관찰합니다.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use pharmacy_core::{PharmacyId, ServerEvent};

use crate::metrics::record_events_delivered;

/// 연결별 이벤트 송신 채널.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
/// 연결별 이벤트 수신 채널.
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

/// 연결 식별자.
///
/// 연결 수명 동안 유일하며 재사용되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// 새 랜덤 연결 ID 생성.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 등록된 연결 정보.
#[derive(Debug)]
struct ConnectionEntry {
    /// 이벤트 송신 채널
    sender: EventSender,
    /// 선언된 약국 신원 (선언 전이면 None)
    pharmacy_id: Option<PharmacyId>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<PharmacyId, HashSet<ConnectionId>>,
}

/// room에서 연결을 제거하고, 비어 있으면 room을 삭제합니다.
fn leave_room(
    rooms: &mut HashMap<PharmacyId, HashSet<ConnectionId>>,
    connection_id: &ConnectionId,
    pharmacy_id: &PharmacyId,
) {
    if let Some(room) = rooms.get_mut(pharmacy_id) {
        room.remove(connection_id);
        if room.is_empty() {
            rooms.remove(pharmacy_id);
        }
    }
}

/// 연결 레지스트리.
///
/// 모든 실시간 연결을 추적하고 약국 신원 단위로 이벤트를 라우팅합니다.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    /// 빈 레지스트리 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 연결 등록.
    ///
    /// 연결에 전달될 이벤트를 받는 수신 채널을 반환합니다.
    /// 등록 직후 연결은 어떤 room에도 속하지 않습니다.
    pub async fn register(&self, connection_id: ConnectionId) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let entry = ConnectionEntry {
            sender: tx,
            pharmacy_id: None,
        };
        if let Some(previous) = inner.connections.insert(connection_id.clone(), entry) {
            if let Some(pharmacy_id) = previous.pharmacy_id {
                leave_room(&mut inner.rooms, &connection_id, &pharmacy_id);
            }
        }

        debug!(connection_id = %connection_id, "Connection registered");
        rx
    }

    /// 연결에 약국 신원 부여.
    ///
    /// 이전 신원이 있으면 해당 room에서 먼저 제거합니다 (연결당 room은 최대 하나).
    /// 같은 신원을 다시 선언해도 멤버십은 변하지 않습니다.
    ///
    /// # Returns
    ///
    /// 등록되지 않은 연결이면 `false`
    pub async fn associate(&self, connection_id: &ConnectionId, pharmacy_id: PharmacyId) -> bool {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let Some(entry) = inner.connections.get_mut(connection_id) else {
            return false;
        };

        if let Some(previous) = entry.pharmacy_id.replace(pharmacy_id.clone()) {
            if previous != pharmacy_id {
                leave_room(&mut inner.rooms, connection_id, &previous);
            }
        }

        inner
            .rooms
            .entry(pharmacy_id)
            .or_default()
            .insert(connection_id.clone());
        true
    }

    /// 연결의 약국 신원 해제.
    ///
    /// 연결 자체는 등록 상태로 남습니다. 해제된 신원을 반환합니다.
    pub async fn dissociate(&self, connection_id: &ConnectionId) -> Option<PharmacyId> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let previous = inner.connections.get_mut(connection_id)?.pharmacy_id.take()?;
        leave_room(&mut inner.rooms, connection_id, &previous);
        Some(previous)
    }

    /// 연결 제거.
    ///
    /// room 멤버십과 송신 채널을 함께 정리합니다. 선언되어 있던 신원을 반환합니다.
    pub async fn unregister(&self, connection_id: &ConnectionId) -> Option<PharmacyId> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let entry = inner.connections.remove(connection_id)?;
        if let Some(ref pharmacy_id) = entry.pharmacy_id {
            leave_room(&mut inner.rooms, connection_id, pharmacy_id);
        }

        debug!(connection_id = %connection_id, "Connection unregistered");
        entry.pharmacy_id
    }

    /// 약국 room의 모든 연결에 이벤트 전달.
    ///
    /// room이 없으면 이벤트는 조용히 버려집니다. 전달 순서는 보장하지 않습니다.
    pub async fn broadcast(&self, pharmacy_id: &PharmacyId, event: ServerEvent) {
        let inner = self.inner.read().await;

        let Some(room) = inner.rooms.get(pharmacy_id) else {
            debug!(pharmacy_id = %pharmacy_id, "No connections in room, event dropped");
            return;
        };

        let mut delivered = 0usize;
        for connection_id in room {
            if let Some(entry) = inner.connections.get(connection_id) {
                // 수신측이 이미 닫혔으면 해당 연결만 건너뜀
                if entry.sender.send(event.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }

        record_events_delivered(delivered);
        debug!(
            pharmacy_id = %pharmacy_id,
            room_size = room.len(),
            delivered,
            "Event broadcast to room"
        );
    }

    /// 특정 연결에만 이벤트 전달.
    pub async fn send_to(&self, connection_id: &ConnectionId, event: ServerEvent) -> bool {
        let inner = self.inner.read().await;
        inner
            .connections
            .get(connection_id)
            .map(|entry| entry.sender.send(event).is_ok())
            .unwrap_or(false)
    }

    /// 연결에 선언된 약국 신원.
    pub async fn pharmacy_of(&self, connection_id: &ConnectionId) -> Option<PharmacyId> {
        let inner = self.inner.read().await;
        inner
            .connections
            .get(connection_id)
            .and_then(|entry| entry.pharmacy_id.clone())
    }

    /// room에 속한 연결 수.
    pub async fn room_size(&self, pharmacy_id: &PharmacyId) -> usize {
        let inner = self.inner.read().await;
        inner.rooms.get(pharmacy_id).map(HashSet::len).unwrap_or(0)
    }

    /// 연결이 특정 room에 속해 있는지 확인.
    pub async fn is_member(&self, connection_id: &ConnectionId, pharmacy_id: &PharmacyId) -> bool {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(pharmacy_id)
            .is_some_and(|room| room.contains(connection_id))
    }

    /// 등록된 연결 수.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// 비어 있지 않은 room 수.
    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }
}

/// 공유 레지스트리 타입.
pub type SharedRegistry = Arc<ConnectionRegistry>;

/// 공유 레지스트리 생성.
pub fn create_connection_registry() -> SharedRegistry {
    Arc::new(ConnectionRegistry::new())
}
