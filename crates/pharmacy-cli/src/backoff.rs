//! 재연결 지연 정책.

use std::time::Duration;

/// 첫 재연결 대기 시간.
pub const INITIAL_DELAY: Duration = Duration::from_secs(1);
/// 최대 재연결 대기 시간.
pub const MAX_DELAY: Duration = Duration::from_secs(5);
/// 연속 재연결 시도 한도.
pub const MAX_ATTEMPTS: u32 = 5;

/// 지수 백오프 재연결 정책.
///
/// 대기 시간은 시도마다 두 배가 되며 `max_delay`에서 멈춥니다.
/// 로그인에 성공하면 시도 횟수는 호출 측에서 초기화합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_DELAY,
            max_delay: MAX_DELAY,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl ReconnectPolicy {
    /// `attempt`번째(1부터) 재연결 전 대기 시간.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// 추가 재연결이 허용되는지 확인.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }
}
