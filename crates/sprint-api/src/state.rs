//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 계정 저장소, 토큰 원장, 토큰 코덱, 세션 수명주기 서비스를
//! 보유하며 Axum의 State extractor를 통해 핸들러와 인증 미들웨어에
//! 주입됩니다. 서명 키는 시작 시 한 번 파생되는 프로세스 전역 읽기 전용
//! 자원이며 런타임 로테이션은 없습니다.

use std::sync::Arc;

use sqlx::PgPool;

use sprint_core::{AccountStore, AuthConfig, TokenStore};

use crate::auth::{AuthService, SigningKeys, TokenCodec};
use crate::repository::{PgAccountStore, PgTokenStore};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 계정 저장소 (외부 협력자, 좁은 인터페이스로만 접근)
    pub accounts: Arc<dyn AccountStore>,
    /// 토큰 원장
    pub tokens: Arc<dyn TokenStore>,
    /// 토큰 코덱
    pub codec: TokenCodec,
    /// 세션 수명주기 서비스
    pub auth: AuthService,
    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// API 버전
    pub version: String,
}

impl AppState {
    /// 저장소 구현과 인증 설정으로 상태 생성.
    ///
    /// # Errors
    ///
    /// 비밀 키가 비어 있거나 256비트 미만이면 실패합니다 (시작 시점
    /// 치명적 오류).
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<dyn TokenStore>,
        auth_config: &AuthConfig,
    ) -> Result<Self, crate::auth::KeyError> {
        let keys = SigningKeys::from_secret(&auth_config.secret_key)?;
        let codec = TokenCodec::new(
            keys,
            auth_config.access_token_ttl_ms,
            auth_config.refresh_token_ttl_ms,
        );
        let auth = AuthService::new(accounts.clone(), tokens.clone(), codec.clone());

        Ok(Self {
            accounts,
            tokens,
            codec,
            auth,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// PostgreSQL 연결 풀 기반 상태 생성.
    pub fn with_pg_pool(pool: PgPool, auth_config: &AuthConfig) -> Result<Self, crate::auth::KeyError> {
        Self::new(
            Arc::new(PgAccountStore::new(pool.clone())),
            Arc::new(PgTokenStore::new(pool)),
            auth_config,
        )
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 실제 DB 연결 없이 인메모리 저장소로 동작하는 상태를 생성합니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use crate::repository::memory::{MemoryAccountStore, MemoryTokenStore};

    let auth_config = AuthConfig {
        secret_key: "0123456789abcdef".repeat(4),
        access_token_ttl_ms: 60_000,
        refresh_token_ttl_ms: 604_800_000,
    };
    AppState::new(
        Arc::new(MemoryAccountStore::new()),
        Arc::new(MemoryTokenStore::new()),
        &auth_config,
    )
    .expect("test state")
}
