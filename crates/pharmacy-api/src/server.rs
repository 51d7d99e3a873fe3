//! 라우터 조립 및 서버 실행.
//!
//! 바이너리와 통합 테스트가 같은 라우터 구성을 사용하도록 분리되어 있습니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use pharmacy_core::CorsConfig;

use crate::middleware::metrics_layer;
use crate::openapi::swagger_ui_router;
use crate::realtime::{realtime_router, RealtimeState};
use crate::routes::create_api_router;
use crate::state::AppState;

/// 라우터 구성 옵션.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// 허용 origin 설정
    pub cors: CorsConfig,
    /// HTTP 요청 타임아웃
    pub request_timeout: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            cors: CorsConfig::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// CORS 레이어 생성.
///
/// origin 목록이 비어 있으면 모든 origin을 허용합니다 (개발 모드).
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let restricted = !origins.is_empty();
    let allow_origin = if restricted {
        info!("CORS configured with {} allowed origins", origins.len());
        AllowOrigin::list(origins)
    } else {
        if !config.origins.is_empty() {
            warn!("CORS origins are set but none are valid, allowing any");
        }
        AllowOrigin::any()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // 자격 증명은 origin 목록이 있을 때만
        .allow_credentials(restricted)
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
///
/// 메트릭 핸들이 없으면 `/metrics`를 마운트하지 않습니다.
pub fn create_router(
    state: Arc<AppState>,
    realtime: RealtimeState,
    metrics_handle: Option<PrometheusHandle>,
    options: &RouterOptions,
) -> Router {
    let mut router = Router::new()
        .merge(create_api_router().with_state(state))
        .merge(realtime_router(realtime))
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router());

    if let Some(handle) = metrics_handle {
        let metrics_router = Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(handle);
        router = router.merge(metrics_router);
    }

    router
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            options.request_timeout,
        ))
        .layer(cors_layer(&options.cors))
}

/// 종료 토큰이 취소될 때까지 서버 실행.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::create_connection_registry;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use tower::ServiceExt;

    fn test_router(cors: CorsConfig) -> Router {
        let registry = create_connection_registry();
        let state = Arc::new(create_test_state().with_realtime(registry.clone()));
        let options = RouterOptions {
            cors,
            ..Default::default()
        };
        create_router(
            state,
            RealtimeState::with_logging_responses(registry),
            None,
            &options,
        )
    }

    #[tokio::test]
    async fn test_router_serves_api_and_health() {
        let app = test_router(CorsConfig::default());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_not_mounted_without_handle() {
        let app = test_router(CorsConfig::default());

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_any_origin_by_default() {
        let app = test_router(CorsConfig::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/ping")
                    .header(header::ORIGIN, "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_restricted_origins() {
        let app = test_router(CorsConfig {
            origins: vec!["http://pharmacy.local".to_string()],
        });

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/ping")
                    .header(header::ORIGIN, "http://pharmacy.local")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://pharmacy.local"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }
}
