//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//!
//! # 로드 순서
//!
//! 1. 코드에 정의된 기본값
//! 2. 설정 파일 (선택, 기본 경로 `config/default.toml`)
//! 3. `PHARMACY__` 접두사 환경 변수 (예: `PHARMACY__SERVER__PORT=3001`)

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 관리자 로그인 설정
    #[serde(default)]
    pub admin: AdminConfig,
    /// CORS 설정
    #[serde(default)]
    pub cors: CorsConfig,
    /// `/api/ping` 응답 메시지
    #[serde(default = "default_ping_message")]
    pub ping_message: String,
}

fn default_ping_message() -> String {
    "ping".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            admin: AdminConfig::default(),
            cors: CorsConfig::default(),
            ping_message: default_ping_message(),
        }
    }
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// HTTP 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 소스 파일과 줄 번호 표시 여부
    #[serde(default)]
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "pharmacy_api=info,tower_http=debug".to_string(),
            format: "pretty".to_string(),
            source_location: false,
        }
    }
}

/// 관리자 로그인 설정.
///
/// 고정된 자격증명 한 쌍과 비교합니다. 비밀번호는 로드 직후 `SecretString`으로 감쌉니다.
#[derive(Debug, Deserialize)]
pub struct AdminConfig {
    /// 관리자 사용자명
    pub username: String,
    /// 관리자 비밀번호
    #[serde(deserialize_with = "deserialize_secret")]
    pub password: SecretString,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: SecretString::new("1234".to_string().into_boxed_str()),
        }
    }
}

impl AdminConfig {
    /// 자격증명 일치 여부 확인.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password.expose_secret() == password
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| SecretString::new(s.into_boxed_str()))
}

/// CORS 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    /// 허용 origin 목록 (비어있으면 모든 origin 허용)
    #[serde(default)]
    pub origins: Vec<String>,
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 설정 파일이 없으면 기본값과 환경 변수만 사용합니다.
    /// `PING_MESSAGE` 환경 변수는 `ping_message`를 덮어씁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001)?
            .set_default("logging.level", "pharmacy_api=info,tower_http=debug")?
            .set_default("logging.format", "pretty")?
            .set_default("logging.source_location", false)?
            .set_default("admin.username", "admin")?
            .set_default("admin.password", "1234")?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("PHARMACY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            )
            .set_override_option("ping_message", std::env::var("PING_MESSAGE").ok())?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address(), "127.0.0.1:3001");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert!(config.cors.origins.is_empty());
        assert!(config.admin.verify("admin", "1234"));
        assert!(!config.admin.verify("admin", "wrong"));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.logging.format, "pretty");
        assert!(!config.logging.source_location);
    }

    #[test]
    fn test_admin_password_is_redacted() {
        let admin = AdminConfig::default();
        let debug = format!("{:?}", admin);
        assert!(!debug.contains("1234"));
    }
}
