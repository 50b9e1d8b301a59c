//! 토큰 원장 (PostgreSQL).
//!
//! `tokens` 테이블에 대한 [`TokenStore`] 구현.
//!
//! `revoke_all`은 단일 UPDATE 문으로 수행되어 동시 `record` 호출 대비
//! 원자적입니다. 같은 로그인 연산 안에서는 폐기 후 기록이 순차 실행되므로
//! 새로 발급된 토큰이 자신의 발급 연산에 의해 폐기되는 일은 없습니다.
//! 동일 계정에 대한 동시 로그인은 마지막 쓰기가 이기는(last-write-wins)
//! 경쟁으로 허용됩니다.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sprint_core::{AuthError, TokenStore};

/// PostgreSQL 토큰 원장.
#[derive(Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    /// 새 원장 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn record(&self, principal_id: Uuid, token: &str) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO tokens (id, user_id, token, token_kind, revoked, expired)
            VALUES ($1, $2, $3, 'BEARER', FALSE, FALSE)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(principal_id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::store(e.to_string()))?;
        Ok(())
    }

    async fn is_active(&self, token: &str) -> Result<bool, AuthError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM tokens
                WHERE token = $1 AND NOT revoked AND NOT expired
            )
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AuthError::store(e.to_string()))
    }

    async fn revoke_all(&self, principal_id: Uuid) -> Result<u64, AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE tokens
            SET revoked = TRUE, expired = TRUE
            WHERE user_id = $1 AND NOT revoked AND NOT expired
            "#,
        )
        .bind(principal_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::store(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn revoke_one(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            UPDATE tokens
            SET revoked = TRUE, expired = TRUE
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::store(e.to_string()))?;
        Ok(())
    }
}
