//! API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use pharmacy_core::NotifyError;

/// API 에러 응답.
///
/// # 예시
///
/// ```json
/// {"error": "Missing required fields: pharmacy_id, drugs, total"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
}

impl ApiErrorResponse {
    /// 에러 응답 생성.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// 알림 에러를 상태 코드와 응답 본문으로 변환.
    ///
    /// 검증 실패는 400, 실시간 서브시스템 부재는 500입니다.
    pub fn from_notify(err: NotifyError) -> (StatusCode, Json<Self>) {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(Self::new(err.to_string())))
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}

impl std::error::Error for ApiErrorResponse {}

// ==================== Result Type Alias ====================

/// API 핸들러 Result 타입 별칭.
///
/// # Example
///
/// ```ignore
/// async fn notify(
///     State(state): State<Arc<AppState>>,
///     Json(request): Json<NotifyRequest>,
/// ) -> ApiResult<Json<NotifyResponse>> {
///     state
///         .dispatch(request)
///         .await
///         .map_err(ApiErrorResponse::from_notify)?;
///     Ok(Json(NotifyResponse::sent()))
/// }
/// ```
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;
