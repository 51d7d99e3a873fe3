//! 약국 알림 API 서버.
//!
//! Axum 기반 HTTP 트리거 엔드포인트와 WebSocket 알림 채널을 시작합니다.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use pharmacy_api::metrics::setup_metrics_recorder;
use pharmacy_api::realtime::{create_connection_registry, RealtimeState};
use pharmacy_api::server::{create_router, serve, RouterOptions};
use pharmacy_api::state::AppState;
use pharmacy_core::{init_logging, AppConfig, LogConfig};

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 종료합니다.
fn handle_export_openapi() -> Result<(), Box<dyn std::error::Error>> {
    use pharmacy_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
        println!("{}", json);
        std::process::exit(0);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    handle_export_openapi()?;

    let config = AppConfig::load_default().map_err(|e| {
        eprintln!("설정 로드 실패: {}", e);
        e
    })?;

    init_logging(LogConfig::from(&config.logging))?;
    info!("Starting Pharmacy Alert API server...");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    // 전역 종료 토큰 (HTTP 서버와 열린 WebSocket 연결에 전파)
    let shutdown_token = CancellationToken::new();

    let registry = create_connection_registry();
    let realtime = RealtimeState::with_logging_responses(registry.clone())
        .with_shutdown(shutdown_token.clone());
    info!("Realtime connection registry initialized");

    let state = Arc::new(
        AppState::new(config.admin, config.ping_message).with_realtime(registry.clone()),
    );
    info!(
        version = %state.version,
        has_realtime = state.has_realtime(),
        "Application state initialized"
    );

    let options = RouterOptions {
        cors: config.cors,
        request_timeout: Duration::from_secs(config.server.request_timeout_secs),
    };
    let app = create_router(state, realtime, Some(metrics_handle), &options);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(
            %addr,
            error = %e,
            "소켓 바인딩에 실패했습니다. PHARMACY__SERVER__HOST, PHARMACY__SERVER__PORT 환경변수를 확인하세요."
        );
        e
    })?;

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);
    info!("WebSocket available at ws://{}/ws", addr);

    tokio::spawn(shutdown_signal(shutdown_token.clone()));
    serve(listener, app, shutdown_token.clone()).await?;

    info!("Server shutdown initiated, cleaning up...");

    // 열린 연결이 정리될 때까지 최대 5초 대기
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while registry.connection_count().await > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;

    if drained.is_err() {
        warn!(
            remaining = registry.connection_count().await,
            "Cleanup timeout, forcing shutdown"
        );
    }

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to open connections");
}
