//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pharmacy_core::NotifyRequest;

use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, HealthResponse, LoginFailure, LoginRequest, LoginResponse,
    NotifyResponse, PingResponse,
};

// ==================== OpenAPI 문서 정의 ====================

/// Pharmacy Alert API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pharmacy Alert API",
        version = "0.1.0",
        description = r#"
# 약국 주문 알림 API

외부 시스템이 주문 알림을 트리거하면, 해당 약국으로 신원을 선언한 모든
실시간 연결(`/ws`)로 `incoming_call` 이벤트가 전달됩니다.

## 실시간 채널

`GET /ws` (WebSocket). 프레임 형식: `{"event": <이름>, "data": <페이로드>}`

- 클라이언트 → 서버: `pharmacy_login`, `response`
- 서버 → 클라이언트: `login_success`, `incoming_call`
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3001", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "notify", description = "알림 - 약국 주문 알림 트리거"),
        (name = "admin", description = "관리자 - 로그인"),
        (name = "health", description = "헬스 체크 - 서버 상태 확인")
    ),
    // ==================== 스키마 등록 ====================
    components(
        schemas(
            // ===== Notify =====
            NotifyRequest,
            NotifyResponse,

            // ===== Admin =====
            LoginRequest,
            LoginResponse,
            LoginFailure,

            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,
            PingResponse,

            // ===== Common =====
            ApiErrorResponse,
        )
    ),
    // ==================== 경로 등록 ====================
    paths(
        crate::routes::notify::notify,
        crate::routes::login::login,
        crate::routes::ping::ping,
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
    )
)]
pub struct ApiDoc;

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
