//! 저장소 구현.
//!
//! 계정 저장소와 토큰 원장의 PostgreSQL 구현을 제공합니다.
//! [`memory`] 모듈의 인메모리 구현은 테스트 및 DB 없는 로컬 개발용입니다.

pub mod memory;
pub mod tokens;
pub mod users;

pub use tokens::PgTokenStore;
pub use users::PgAccountStore;

use sqlx::PgPool;

/// 인증 스키마 마이그레이션 실행.
///
/// 테이블이 이미 존재하면 아무 동작도 하지 않습니다.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!(
        "../../migrations/0001_create_auth_tables.sql"
    ))
    .execute(pool)
    .await?;
    Ok(())
}
