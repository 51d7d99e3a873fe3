//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 알림 전달 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 반환값
///
/// `/metrics` 엔드포인트에서 메트릭을 렌더링하기 위한 `PrometheusHandle`.
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        // HTTP 요청 지속 시간 히스토그램 버킷 설정
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 알림 메트릭 헬퍼 함수
// ============================================================================

/// 알림 요청 처리 결과 카운터 증가.
///
/// `outcome`: `dispatched`, `invalid`, `unavailable`
pub fn record_notification(outcome: &'static str) {
    counter!("pharmacy_notifications_total", "outcome" => outcome).increment(1);
}

/// 브로드캐스트로 실제 전달된 이벤트 수 기록.
pub fn record_events_delivered(count: usize) {
    counter!("pharmacy_events_delivered_total").increment(count as u64);
}

/// 약국 신원 선언 카운터 증가.
pub fn record_pharmacy_login() {
    counter!("pharmacy_logins_total").increment(1);
}

/// 약국 응답 카운터 증가.
pub fn record_pharmacy_response(decision: &'static str) {
    counter!("pharmacy_responses_total", "decision" => decision).increment(1);
}

/// 관리자 로그인 시도 카운터 증가.
pub fn record_admin_login(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("admin_login_attempts_total", "result" => result).increment(1);
}

/// WebSocket 연결 수 증가.
pub fn increment_websocket_connections() {
    gauge!("websocket_connections_active").increment(1.0);
}

/// WebSocket 연결 수 감소.
pub fn decrement_websocket_connections() {
    gauge!("websocket_connections_active").decrement(1.0);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 메트릭 라벨용으로 경로를 정규화합니다.
///
/// - Swagger UI 정적 파일은 `/swagger-ui/*`로 묶습니다.
/// - UUID나 숫자 세그먼트는 `:id`로 대체합니다.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with("/swagger-ui/") {
        return "/swagger-ui/*".to_string();
    }

    path.split('/')
        .map(|segment| {
            let is_uuid = segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4;
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());

            if is_uuid || is_numeric {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
