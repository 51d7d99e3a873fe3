//! tracing 기반 로깅 초기화.
//!
//! 서버와 CLI가 같은 구독자 구성을 사용합니다. 출력 형식은 세 가지입니다:
//! - **pretty**: 개발용 여러 줄 형식
//! - **json**: 로그 수집기용 한 줄 JSON
//! - **compact**: 한 줄 요약 형식
//!
//! 레벨은 `RUST_LOG`, 형식은 `LOG_FORMAT`이 설정 파일보다 우선합니다.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 구독자 초기화 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` 지시문 (예: "pharmacy_api=debug,tower_http=info")
    pub level: String,
    pub format: LogFormat,
    /// 이벤트에 소스 파일과 줄 번호 표시
    pub source_location: bool,
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            source_location: false,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 설정 파일 없이 환경 변수만으로 구성합니다 (CLI용).
    ///
    /// `RUST_LOG`가 없으면 `info`를 사용합니다.
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        Self::new(level).with_format(env_format().unwrap_or_default())
    }
}

impl From<&LoggingConfig> for LogConfig {
    /// 알 수 없는 형식 문자열은 `Pretty`로 대체합니다.
    fn from(config: &LoggingConfig) -> Self {
        let format = env_format()
            .or_else(|| config.format.parse().ok())
            .unwrap_or_default();

        Self {
            level: config.level.clone(),
            format,
            source_location: config.source_location,
        }
    }
}

fn env_format() -> Option<LogFormat> {
    std::env::var("LOG_FORMAT").ok()?.parse().ok()
}

/// 전역 tracing 구독자를 설치합니다.
///
/// 프로세스당 한 번만 성공하며, 이미 설치되어 있으면 에러를 반환합니다.
///
/// ```no_run
/// use pharmacy_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("debug").with_format(LogFormat::Json)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    let base = fmt::layer()
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(base.pretty())
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(base.json())
            .try_init()?,
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(base.compact())
            .try_init()?,
    }

    tracing::info!(
        format = ?config.format,
        level = %config.level,
        source_location = config.source_location,
        "Logging initialized"
    );
    Ok(())
}
