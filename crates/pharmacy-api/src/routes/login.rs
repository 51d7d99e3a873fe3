//! 관리자 로그인 endpoint.
//!
//! 설정된 관리자 자격증명 한 쌍과 비교만 합니다. 발급 토큰은 다른 엔드포인트에서
//! 검증하지 않는 표시용 값입니다.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::metrics::record_admin_login;
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// 사용자명
    #[serde(default)]
    pub username: String,
    /// 비밀번호
    #[serde(default)]
    pub password: String,
}

/// 로그인 성공 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// 항상 true
    pub authenticated: bool,
    /// `admin-token-<밀리초 타임스탬프>`
    pub token: String,
}

/// 로그인 실패 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginFailure {
    /// 항상 false
    pub authenticated: bool,
    /// 실패 사유
    pub error: String,
}

/// 자격증명 불일치 메시지.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn unauthorized(error: impl Into<String>) -> Response {
    let body = LoginFailure {
        authenticated: false,
        error: error.into(),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

fn issue_token() -> String {
    format!("admin-token-{}", chrono::Utc::now().timestamp_millis())
}

/// 관리자 로그인.
///
/// JSON으로 읽을 수 없는 본문도 자격증명 불일치와 같은 401로 응답합니다.
/// POST /api/login
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = LoginResponse),
        (status = 401, description = "자격증명 불일치", body = LoginFailure)
    ),
    tag = "admin"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Unreadable login body");
            record_admin_login(false);
            return unauthorized(INVALID_CREDENTIALS);
        }
    };

    if state.admin.verify(&request.username, &request.password) {
        info!(username = %request.username, "Admin login succeeded");
        record_admin_login(true);
        let body = LoginResponse {
            authenticated: true,
            token: issue_token(),
        };
        (StatusCode::OK, Json(body)).into_response()
    } else {
        warn!(username = %request.username, "Admin login failed");
        record_admin_login(false);
        unauthorized(INVALID_CREDENTIALS)
    }
}

/// 로그인 라우터 생성.
pub fn login_router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn post_login(body: Value) -> (StatusCode, Value) {
        let app = Router::new()
            .nest("/api", login_router())
            .with_state(Arc::new(create_test_state()));

        let request = Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_login_success() {
        let (status, body) = post_login(json!({"username": "admin", "password": "1234"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], true);
        let token = body["token"].as_str().unwrap();
        let millis = token.strip_prefix("admin-token-").unwrap();
        assert!(millis.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (status, body) = post_login(json!({"username": "admin", "password": "nope"})).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({"authenticated": false, "error": "Invalid credentials"})
        );
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let (status, body) = post_login(json!({})).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["authenticated"], false);
    }

    async fn post_raw(content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
        let app = Router::new()
            .nest("/api", login_router())
            .with_state(Arc::new(create_test_state()));

        let mut builder = Request::builder().method("POST").uri("/api/login");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let response = app.oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_login_unreadable_body_is_unauthorized() {
        let expected = json!({"authenticated": false, "error": "Invalid credentials"});

        // JSON이 아닌 본문
        let (status, body) = post_raw(Some("application/json"), "username=admin").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, expected);

        // Content-Type 누락
        let (status, body) = post_raw(None, r#"{"username":"admin","password":"1234"}"#).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, expected);

        // 필드 타입 불일치
        let (status, body) = post_raw(Some("application/json"), r#"{"username": 1}"#).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, expected);
    }
}
