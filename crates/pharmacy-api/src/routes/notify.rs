//! 주문 알림 트리거 endpoint.
//!
//! 외부 시스템이 약국 앞으로 주문 알림을 보낼 때 호출합니다.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use pharmacy_core::NotifyRequest;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 알림 전송 성공 메시지.
pub const NOTIFICATION_SENT: &str = "Notification sent";

/// 알림 트리거 응답.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NotifyResponse {
    /// 항상 true
    pub success: bool,
    /// 처리 결과 메시지
    pub message: String,
}

impl NotifyResponse {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: NOTIFICATION_SENT.to_string(),
        }
    }
}

/// 주문 알림 트리거.
///
/// 연결된 약국이 없어도 성공을 반환합니다.
/// JSON 본문이 아니거나 필드 타입이 맞지 않으면 400을 반환합니다.
/// POST /api/notify
#[utoipa::path(
    post,
    path = "/api/notify",
    request_body = NotifyRequest,
    responses(
        (status = 200, description = "알림 전송", body = NotifyResponse),
        (status = 400, description = "필수 필드 누락 또는 형식 오류", body = ApiErrorResponse),
        (status = 500, description = "실시간 채널 미초기화", body = ApiErrorResponse)
    ),
    tag = "notify"
)]
pub async fn notify(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> ApiResult<Json<NotifyResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::new(rejection.body_text())),
        )
    })?;
    debug!(pharmacy_id = ?request.pharmacy_id, "Notify request received");
    state
        .dispatch(request)
        .await
        .map_err(ApiErrorResponse::from_notify)?;
    Ok(Json(NotifyResponse::sent()))
}

/// 알림 트리거 라우터 생성.
pub fn notify_router() -> Router<Arc<AppState>> {
    Router::new().route("/notify", post(notify))
}
