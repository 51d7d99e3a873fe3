//! 리스너/트리거 클라이언트 통합 테스트
//!
//! 같은 프로세스에 알림 서버를 띄우고 CLI 클라이언트로 전체 흐름을 검증합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pharmacy_api::realtime::{
    create_connection_registry, ConnectionId, RealtimeState, ResponseSink, SharedRegistry,
};
use pharmacy_api::server::{create_router, serve, RouterOptions};
use pharmacy_api::state::AppState;
use pharmacy_cli::{ClientError, PharmacyListener, ReconnectPolicy, TriggerClient};
use pharmacy_core::{AdminConfig, NotifyRequest, PharmacyId, PharmacyResponse};

const TIMEOUT: Duration = Duration::from_secs(3);

/// 받은 응답을 채널로 넘기는 수신자
struct ChannelSink(mpsc::UnboundedSender<PharmacyResponse>);

#[async_trait]
impl ResponseSink for ChannelSink {
    async fn deliver(&self, _connection_id: &ConnectionId, response: PharmacyResponse) {
        let _ = self.0.send(response);
    }
}

struct TestServer {
    addr: SocketAddr,
    registry: SharedRegistry,
    shutdown: CancellationToken,
    responses: mpsc::UnboundedReceiver<PharmacyResponse>,
}

impl TestServer {
    async fn start() -> Self {
        let registry = create_connection_registry();
        let shutdown = CancellationToken::new();
        let (tx, responses) = mpsc::unbounded_channel();

        let state =
            Arc::new(AppState::new(AdminConfig::default(), "ping").with_realtime(registry.clone()));
        let realtime = RealtimeState::new(registry.clone(), Arc::new(ChannelSink(tx)))
            .with_shutdown(shutdown.clone());
        let app = create_router(state, realtime, None, &RouterOptions::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, app, shutdown.clone()));

        Self {
            addr,
            registry,
            shutdown,
            responses,
        }
    }

    fn http_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    async fn wait_for_room(&self, pharmacy_id: &str, expected: usize) {
        let id = PharmacyId::new(pharmacy_id).unwrap();
        tokio::time::timeout(TIMEOUT, async {
            while self.registry.room_size(&id).await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("room did not reach expected size");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[tokio::test]
async fn test_listener_receives_call_and_responds() {
    let mut server = TestServer::start().await;

    let stop = CancellationToken::new();
    let listener = PharmacyListener::new(server.ws_url(), PharmacyId::new("123").unwrap())
        .with_shutdown(stop.clone());
    let (calls_tx, mut calls) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        listener
            .run(move |call| {
                let _ = calls_tx.send(call.clone());
                Some(true)
            })
            .await
    });
    server.wait_for_room("123", 1).await;

    let trigger = TriggerClient::new(server.http_url()).unwrap();
    let ack = trigger
        .notify(&NotifyRequest::new(
            "123",
            vec!["Aspirin".to_string(), "Ibuprofen".to_string()],
            23000i64,
        ))
        .await
        .unwrap();
    assert!(ack.success);
    assert_eq!(ack.message, "Notification sent");

    let call = tokio::time::timeout(TIMEOUT, calls.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(call.drugs, vec!["Aspirin", "Ibuprofen"]);
    assert_eq!(call.total, 23000);

    let response = tokio::time::timeout(TIMEOUT, server.responses.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response, PharmacyResponse::new(PharmacyId::new("123").unwrap(), true));

    stop.cancel();
    let result = tokio::time::timeout(TIMEOUT, handle).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_listener_without_reply_sends_nothing() {
    let mut server = TestServer::start().await;

    let stop = CancellationToken::new();
    let listener = PharmacyListener::new(server.ws_url(), PharmacyId::new("456").unwrap())
        .with_shutdown(stop.clone());
    let handle = tokio::spawn(async move { listener.run(|_| None).await });
    server.wait_for_room("456", 1).await;

    TriggerClient::new(server.http_url())
        .unwrap()
        .notify(&NotifyRequest::new("456", "Aspirin", 100i64))
        .await
        .unwrap();

    let silent = tokio::time::timeout(Duration::from_millis(300), server.responses.recv()).await;
    assert!(silent.is_err());

    stop.cancel();
    let _ = tokio::time::timeout(TIMEOUT, handle).await;
}

#[tokio::test]
async fn test_trigger_reports_validation_error() {
    let server = TestServer::start().await;
    let trigger = TriggerClient::new(server.http_url()).unwrap();

    let err = trigger
        .notify(&NotifyRequest::new("123", Vec::<String>::new(), 100i64))
        .await
        .unwrap_err();

    match err {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Missing required fields: pharmacy_id, drugs, total");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_listener_reconnects_after_server_closes() {
    let server = TestServer::start().await;

    let stop = CancellationToken::new();
    let listener = PharmacyListener::new(server.ws_url(), PharmacyId::new("123").unwrap())
        .with_policy(ReconnectPolicy {
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(50),
            max_attempts: 2,
        })
        .with_shutdown(stop.clone());
    let handle = tokio::spawn(async move { listener.run(|_| None).await });
    server.wait_for_room("123", 1).await;

    // 서버 종료 후 재연결 시도가 모두 실패하면 리스너가 포기함
    server.shutdown.cancel();

    let result = tokio::time::timeout(TIMEOUT, handle).await.unwrap().unwrap();
    assert!(matches!(
        result,
        Err(ClientError::ReconnectExhausted { attempts: 2 })
    ));
}
