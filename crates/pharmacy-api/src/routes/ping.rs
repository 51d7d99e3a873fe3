//! 연결 확인 endpoint.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

/// ping 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    /// 설정된 메시지 (`PING_MESSAGE`)
    pub message: String,
}

/// 설정된 ping 메시지 반환.
///
/// GET /api/ping
#[utoipa::path(
    get,
    path = "/api/ping",
    responses(
        (status = 200, description = "설정된 메시지", body = PingResponse)
    ),
    tag = "health"
)]
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        message: state.ping_message.clone(),
    })
}

/// ping 라우터 생성.
pub fn ping_router() -> Router<Arc<AppState>> {
    Router::new().route("/ping", get(ping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_ping_returns_configured_message() {
        let mut state = create_test_state();
        state.ping_message = "hello from pharmacy".to_string();
        let app = Router::new()
            .nest("/api", ping_router())
            .with_state(Arc::new(state));

        let response = app
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let ping: PingResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(ping.message, "hello from pharmacy");
    }
}
