//! 약국 알림 수신 클라이언트.
//!
//! 서버의 `/ws`에 접속해 약국 신원을 선언하고 `incoming_call`을 받습니다.
//! 연결이 끊기면 [`ReconnectPolicy`]에 따라 다시 접속하며, 접속할 때마다 신원을 다시 선언합니다.

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use pharmacy_core::{ClientEvent, OrderNotification, PharmacyId, PharmacyResponse, ServerEvent};

use crate::backoff::ReconnectPolicy;
use crate::error::{ClientError, ClientResult};

/// 한 번의 연결이 끝난 이유.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// 종료 요청
    Shutdown,
    /// 서버가 연결을 닫음
    Closed,
}

/// 약국 알림 리스너.
pub struct PharmacyListener {
    url: String,
    pharmacy_id: PharmacyId,
    policy: ReconnectPolicy,
    shutdown: CancellationToken,
}

impl PharmacyListener {
    /// 새 리스너 생성.
    ///
    /// `url`은 WebSocket 엔드포인트 전체 주소입니다 (예: `ws://127.0.0.1:3001/ws`).
    pub fn new(url: impl Into<String>, pharmacy_id: PharmacyId) -> Self {
        Self {
            url: url.into(),
            pharmacy_id,
            policy: ReconnectPolicy::default(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 재연결 정책 설정.
    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 종료 토큰 설정.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn pharmacy_id(&self) -> &PharmacyId {
        &self.pharmacy_id
    }

    /// 종료 요청 또는 재연결 한도 초과까지 알림을 수신합니다.
    ///
    /// `on_call`이 `Some(accepted)`를 반환하면 해당 결정을 `response`로 보냅니다.
    pub async fn run<F>(&self, mut on_call: F) -> ClientResult<()>
    where
        F: FnMut(&OrderNotification) -> Option<bool> + Send,
    {
        let mut attempts = 0u32;

        loop {
            match self.run_session(&mut on_call, &mut attempts).await {
                Ok(SessionEnd::Shutdown) => {
                    info!(pharmacy_id = %self.pharmacy_id, "Listener stopped");
                    return Ok(());
                }
                Ok(SessionEnd::Closed) => {
                    warn!(pharmacy_id = %self.pharmacy_id, "Disconnected from server");
                }
                Err(e) if e.is_transient() => {
                    error!(pharmacy_id = %self.pharmacy_id, "Connection error: {}", e);
                }
                Err(e) => return Err(e),
            }

            attempts += 1;
            if !self.policy.allows(attempts) {
                error!(
                    "최대 재연결 시도 횟수 초과 ({}회)",
                    self.policy.max_attempts
                );
                return Err(ClientError::ReconnectExhausted {
                    attempts: self.policy.max_attempts,
                });
            }

            let delay = self.policy.delay_for(attempts);
            warn!(
                "{:?} 후 재연결 시도 ({}/{})",
                delay, attempts, self.policy.max_attempts
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.cancelled() => return Ok(()),
            }
        }
    }

    /// 연결 하나를 처리합니다.
    async fn run_session<F>(&self, on_call: &mut F, attempts: &mut u32) -> ClientResult<SessionEnd>
    where
        F: FnMut(&OrderNotification) -> Option<bool> + Send,
    {
        info!(url = %self.url, "Connecting to notification server");
        let (ws, _) = connect_async(self.url.as_str()).await?;
        let (mut write, mut read) = ws.split();

        let login = ClientEvent::PharmacyLogin {
            pharmacy_id: self.pharmacy_id.clone(),
        };
        write.send(Message::Text(login.to_json()?)).await?;

        loop {
            let frame = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(SessionEnd::Shutdown);
                }
                frame = read.next() => frame,
            };

            let text = match frame {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => return Ok(SessionEnd::Closed),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            };

            match ServerEvent::from_json(&text) {
                Ok(ServerEvent::LoginSuccess { pharmacy_id }) => {
                    info!(pharmacy_id = %pharmacy_id, "Pharmacy login successful");
                    *attempts = 0;
                }
                Ok(ServerEvent::IncomingCall(call)) => {
                    info!(
                        pharmacy_id = %call.pharmacy_id,
                        drugs = ?call.drugs,
                        total = call.total,
                        "Incoming call received"
                    );
                    if let Some(accepted) = on_call(&call) {
                        let response = ClientEvent::Response(PharmacyResponse::new(
                            call.pharmacy_id.clone(),
                            accepted,
                        ));
                        write.send(Message::Text(response.to_json()?)).await?;
                        debug!(accepted, "Response sent");
                    }
                }
                Err(e) => warn!("Ignoring unexpected frame: {}", e),
            }
        }
    }
}

/// HTTP 서버 주소를 WebSocket 엔드포인트 주소로 변환합니다.
///
/// `http://host:port` → `ws://host:port/ws`, `https://` → `wss://`
pub fn websocket_url(server: &str) -> ClientResult<String> {
    let server = server.trim_end_matches('/');
    let rest = if let Some(rest) = server.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = server.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if server.starts_with("ws://") || server.starts_with("wss://") {
        server.to_string()
    } else {
        return Err(ClientError::InvalidUrl(server.to_string()));
    };

    if rest.ends_with("/ws") {
        Ok(rest)
    } else {
        Ok(format!("{}/ws", rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_websocket_url() {
        assert_eq!(
            websocket_url("http://127.0.0.1:3001").unwrap(),
            "ws://127.0.0.1:3001/ws"
        );
        assert_eq!(
            websocket_url("https://alerts.example.com/").unwrap(),
            "wss://alerts.example.com/ws"
        );
        assert_eq!(
            websocket_url("ws://localhost:3001/ws").unwrap(),
            "ws://localhost:3001/ws"
        );
        assert!(websocket_url("localhost:3001").is_err());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        // 바인딩 후 즉시 닫아 접속이 거부되는 포트 확보
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let policy = ReconnectPolicy {
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(10),
            max_attempts: 2,
        };
        let listener = PharmacyListener::new(
            format!("ws://{}/ws", addr),
            PharmacyId::new("123").unwrap(),
        )
        .with_policy(policy);

        let err = listener.run(|_| None).await.unwrap_err();
        assert!(matches!(err, ClientError::ReconnectExhausted { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_shutdown_during_backoff() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let shutdown = CancellationToken::new();
        let client = PharmacyListener::new(
            format!("ws://{}/ws", addr),
            PharmacyId::new("123").unwrap(),
        )
        .with_policy(ReconnectPolicy {
            initial_delay: Duration::from_secs(30),
            ..Default::default()
        })
        .with_shutdown(shutdown.clone());

        let handle = tokio::spawn(async move { client.run(|_| None).await });
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
