//! 주문 알림 트리거 클라이언트.
//!
//! `POST /api/notify`를 호출하는 얇은 HTTP 래퍼입니다.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use pharmacy_core::NotifyRequest;

use crate::error::{ClientError, ClientResult};

/// 트리거 성공 응답.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotifyAck {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// 트리거 HTTP 클라이언트.
pub struct TriggerClient {
    base_url: String,
    http: reqwest::Client,
}

impl TriggerClient {
    /// 서버 주소로 클라이언트 생성.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// 주문 알림을 트리거합니다.
    ///
    /// 서버가 2xx 이외의 상태를 반환하면 [`ClientError::Rejected`]가 됩니다.
    pub async fn notify(&self, request: &NotifyRequest) -> ClientResult<NotifyAck> {
        let url = format!("{}/api/notify", self.base_url);
        debug!(%url, "Sending notification trigger");

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let ack: NotifyAck = response.json().await?;
        info!(message = %ack.message, "Notification trigger accepted");
        Ok(ack)
    }
}
