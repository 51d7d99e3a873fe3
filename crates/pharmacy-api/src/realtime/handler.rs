//! WebSocket 연결 handler.
//!
//! Axum WebSocket 엔드포인트 및 프레임 처리.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::registry::{ConnectionId, SharedRegistry};
use super::response::{LoggingResponseSink, SharedResponseSink};
use super::session::Session;
use crate::metrics::{decrement_websocket_connections, increment_websocket_connections};

/// 종료 시 대기 중인 이벤트를 흘려보낼 최대 시간.
const SEND_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// 실시간 채널 상태.
#[derive(Clone)]
pub struct RealtimeState {
    /// 연결 레지스트리
    pub registry: SharedRegistry,
    /// 약국 응답 수신자
    pub responses: SharedResponseSink,
    /// 서버 종료 시 열린 연결을 닫기 위한 토큰
    pub shutdown: CancellationToken,
}

impl RealtimeState {
    pub fn new(registry: SharedRegistry, responses: SharedResponseSink) -> Self {
        Self {
            registry,
            responses,
            shutdown: CancellationToken::new(),
        }
    }

    /// 종료 토큰 설정.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// 응답을 로그로만 남기는 기본 상태 생성.
    pub fn with_logging_responses(registry: SharedRegistry) -> Self {
        Self::new(registry, Arc::new(LoggingResponseSink))
    }
}

/// WebSocket 업그레이드 핸들러.
///
/// # 엔드포인트
///
/// `GET /ws`
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<RealtimeState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// WebSocket 연결 처리.
async fn handle_socket(socket: WebSocket, state: RealtimeState) {
    let connection_id = ConnectionId::generate();
    info!(connection_id = %connection_id, "WebSocket connected");
    increment_websocket_connections();

    let (mut session, mut events) =
        Session::open(connection_id.clone(), state.registry.clone(), state.responses.clone())
            .await;

    let (mut sender, mut receiver) = socket.split();

    // 레지스트리 이벤트 → 소켓
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event.to_json() {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        return;
                    }
                }
                Err(e) => warn!("Failed to serialize event: {}", e),
            }
        }
        // 세션이 종료되어 채널이 닫힘
        let _ = sender.send(Message::Close(None)).await;
    });

    loop {
        tokio::select! {
            frame = receiver.next() => {
                match frame {
                    Some(Ok(msg)) => {
                        if !handle_client_message(&mut session, msg).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(connection_id = %connection_id, "WebSocket receive error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
            _ = &mut send_task => {
                debug!(connection_id = %connection_id, "Send task ended");
                break;
            }
            _ = state.shutdown.cancelled() => {
                debug!(connection_id = %connection_id, "Server shutting down, closing connection");
                break;
            }
        }
    }

    session.terminate().await;
    if !send_task.is_finished()
        && tokio::time::timeout(SEND_DRAIN_TIMEOUT, &mut send_task)
            .await
            .is_err()
    {
        send_task.abort();
    }

    decrement_websocket_connections();
    info!(connection_id = %connection_id, "WebSocket disconnected");
}

/// 클라이언트 프레임 처리.
///
/// # Returns
///
/// `true`면 연결 유지, `false`면 연결 종료
async fn handle_client_message(session: &mut Session, msg: Message) -> bool {
    match msg {
        Message::Text(text) => session.handle_text(text.as_str()).await,
        Message::Binary(_) => {
            warn!(connection_id = %session.id(), "Binary frames not supported");
            true
        }
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            debug!(connection_id = %session.id(), "Close frame received");
            false
        }
    }
}

/// 실시간 채널 라우터 생성.
///
/// `/ws` 경로에 업그레이드 핸들러를 마운트합니다.
pub fn realtime_router<S>(state: RealtimeState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::registry::create_connection_registry;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[test]
    fn test_realtime_state_shares_registry() {
        let registry = create_connection_registry();
        let state = RealtimeState::with_logging_responses(registry.clone());
        assert!(Arc::ptr_eq(&state.registry, &registry));
    }

    #[tokio::test]
    async fn test_plain_get_is_not_upgraded() {
        let state = RealtimeState::with_logging_responses(create_connection_registry());
        let app: Router = realtime_router(state);

        let response = app
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // 업그레이드 헤더 없는 요청은 거부
        assert!(response.status().is_client_error());
        assert_ne!(response.status(), StatusCode::NOT_FOUND);
    }
}
