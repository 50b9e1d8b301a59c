//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정은 TOML 파일에서 로드된 후 `SPRINT__` 접두사 환경 변수로
//! 오버라이드됩니다 (예: `SPRINT__AUTH__SECRET_KEY`).

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증/토큰 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL
    pub url: String,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/sprintplus".to_string(),
            max_connections: 10,
            connection_timeout_secs: 30,
        }
    }
}

/// 인증/토큰 설정.
///
/// `secret_key`는 HEX, Base64, 원시 UTF-8 세 가지 인코딩을 모두 허용하며
/// 디코딩 결과가 256비트(32바이트) 이상이어야 합니다. 검증은 시작 시점에
/// 키 자재 모듈에서 수행되고 실패하면 서비스가 기동되지 않습니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 토큰 서명 비밀 키 (HEX | Base64 | 원시 UTF-8)
    pub secret_key: String,
    /// Access token 수명 (밀리초)
    pub access_token_ttl_ms: i64,
    /// Refresh token 수명 (밀리초)
    pub refresh_token_ttl_ms: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            // 24시간
            access_token_ttl_ms: 86_400_000,
            // 7일
            refresh_token_ttl_ms: 604_800_000,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("SPRINT")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 설정 파일 없이 환경 변수에서만 설정을 로드합니다.
    ///
    /// 파일에 없는 값은 [`Default`] 구현의 기본값을 사용합니다.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("SPRINT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut loaded: AppConfig = config.try_deserialize().unwrap_or_default();

        // 관례적인 단일 환경 변수도 지원 (컨테이너 배포 호환)
        if let Ok(url) = std::env::var("DATABASE_URL") {
            loaded.database.url = url;
        }
        if let Ok(secret) = std::env::var("JWT_SECRET_KEY") {
            loaded.auth.secret_key = secret;
        }
        Ok(loaded)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_auth_config() {
        let config = AuthConfig::default();

        // Access와 Refresh는 별도의 TTL 클래스를 가진다
        assert_eq!(config.access_token_ttl_ms, 86_400_000);
        assert_eq!(config.refresh_token_ttl_ms, 604_800_000);
        assert!(config.refresh_token_ttl_ms > config.access_token_ttl_ms);
        assert!(config.secret_key.is_empty());
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_config_roundtrip_serde() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.auth.access_token_ttl_ms, config.auth.access_token_ttl_ms);
        assert_eq!(parsed.database.max_connections, config.database.max_connections);
    }
}
