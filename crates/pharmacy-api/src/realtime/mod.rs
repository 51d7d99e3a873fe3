//! 약국 실시간 알림 채널.
//!
//! 약국 클라이언트가 WebSocket으로 접속해 신원을 선언하면, 해당 약국 앞으로 들어오는
//! 주문 알림을 실시간으로 받습니다.
//!
//! # 흐름
//!
//! 1. 클라이언트가 `/ws`로 접속 (신원 미선언 상태)
//! 2. `pharmacy_login` 전송 → 약국 room 합류, `login_success` 수신
//! 3. `POST /api/notify` 요청 시 해당 room의 모든 연결이 `incoming_call` 수신
//! 4. 클라이언트가 `response`로 수락/거절 응답
//!
//! 메시지 형식은 [`pharmacy_core::protocol`]을 참고하세요.

pub mod dispatcher;
pub mod handler;
pub mod registry;
pub mod response;
pub mod session;

pub use dispatcher::NotificationDispatcher;
pub use handler::{realtime_router, websocket_handler, RealtimeState};
pub use registry::{
    create_connection_registry, ConnectionId, ConnectionRegistry, EventReceiver, EventSender,
    SharedRegistry,
};
pub use response::{LoggingResponseSink, ResponseSink, SharedResponseSink};
pub use session::{Session, SessionState};
