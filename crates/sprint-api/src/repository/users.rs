//! 계정 저장소 (PostgreSQL).
//!
//! `users` 테이블에 대한 [`AccountStore`] 구현.
//! 로그인 식별자 조회는 이메일 우선, 그다음 사용자명 순서로
//! 대소문자 무시 비교를 수행합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use sprint_core::{AccountStore, AuthError, Role, User};

use crate::auth::password::verify_password;

/// DB에서 조회한 계정 row.
#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    roles: Vec<String>,
    enabled: bool,
    password_change_required: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            // 알 수 없는 역할 문자열은 무시 (닫힌 집합 밖의 값은 권한 없음)
            roles: self.roles.iter().filter_map(|r| Role::parse(r)).collect(),
            enabled: self.enabled,
            password_change_required: self.password_change_required,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
     roles, enabled, password_change_required, created_at, updated_at";

/// PostgreSQL 계정 저장소.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// 새 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_column(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<User>, AuthError> {
        let query = format!(
            "SELECT {} FROM users WHERE LOWER({}) = LOWER($1)",
            SELECT_COLUMNS, column
        );
        let row: Option<UserRow> = sqlx::query_as(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::store(e.to_string()))?;
        Ok(row.map(UserRow::into_user))
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AuthError> {
        // 이메일 우선, 그다음 사용자명
        if let Some(user) = self.fetch_by_column("email", login).await? {
            return Ok(Some(user));
        }
        self.fetch_by_column("username", login).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", SELECT_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::store(e.to_string()))?;
        Ok(row.map(UserRow::into_user))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AuthError::store(e.to_string()))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::store(e.to_string()))
    }

    async fn verify_credentials(
        &self,
        login: &str,
        raw_password: &str,
    ) -> Result<bool, AuthError> {
        // 계정 미존재/비활성/해시 불일치를 구분하지 않고 false 반환
        let Some(user) = self.find_by_login(login).await? else {
            return Ok(false);
        };
        if !user.enabled {
            return Ok(false);
        }
        Ok(verify_password(raw_password, &user.password_hash).is_ok())
    }

    async fn save(&self, user: &User) -> Result<(), AuthError> {
        let roles: Vec<String> = user.roles.iter().map(|r| r.as_str().to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, first_name, last_name,
                roles, enabled, password_change_required, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                roles = EXCLUDED.roles,
                enabled = EXCLUDED.enabled,
                password_change_required = EXCLUDED.password_change_required,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&roles)
        .bind(user.enabled)
        .bind(user.password_change_required)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::store(e.to_string()))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, AuthError> {
        let query = format!("SELECT {} FROM users ORDER BY created_at", SELECT_COLUMNS);
        let rows: Vec<UserRow> = sqlx::query_as(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AuthError::store(e.to_string()))?;
        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }
}
