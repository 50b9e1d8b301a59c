//! 인메모리 저장소.
//!
//! 테스트와 DB 없는 로컬 개발을 위한 [`AccountStore`]/[`TokenStore`]
//! 구현입니다. PostgreSQL 구현과 동일한 계약(대소문자 무시 조회,
//! 폐기/만료 플래그 동시 갱신, 감사 추적 누적)을 따릅니다.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use sprint_core::{AccountStore, AuthError, TokenStore, User};

use crate::auth::password::verify_password;

/// 인메모리 계정 저장소.
#[derive(Default)]
pub struct MemoryAccountStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryAccountStore {
    /// 새 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().await;
        // 이메일 우선, 그다음 사용자명
        let by_email = users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(login))
            .cloned();
        if by_email.is_some() {
            return Ok(by_email);
        }
        Ok(users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(login))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| u.username.eq_ignore_ascii_case(username)))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn verify_credentials(
        &self,
        login: &str,
        raw_password: &str,
    ) -> Result<bool, AuthError> {
        let Some(user) = self.find_by_login(login).await? else {
            return Ok(false);
        };
        if !user.enabled {
            return Ok(false);
        }
        Ok(verify_password(raw_password, &user.password_hash).is_ok())
    }

    async fn save(&self, user: &User) -> Result<(), AuthError> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, AuthError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

/// 토큰 원장 레코드.
#[derive(Debug, Clone)]
struct TokenRecord {
    user_id: Uuid,
    token: String,
    revoked: bool,
    expired: bool,
}

/// 인메모리 토큰 원장.
#[derive(Default)]
pub struct MemoryTokenStore {
    records: RwLock<Vec<TokenRecord>>,
}

impl MemoryTokenStore {
    /// 새 원장 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 해당 계정의 활성 토큰 수 (검증용).
    pub async fn active_count(&self, principal_id: Uuid) -> usize {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == principal_id && !r.revoked && !r.expired)
            .count()
    }

    /// 전체 레코드 수 (검증용). 레코드는 삭제되지 않고 누적된다.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn record(&self, principal_id: Uuid, token: &str) -> Result<(), AuthError> {
        self.records.write().await.push(TokenRecord {
            user_id: principal_id,
            token: token.to_string(),
            revoked: false,
            expired: false,
        });
        Ok(())
    }

    async fn is_active(&self, token: &str) -> Result<bool, AuthError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .any(|r| r.token == token && !r.revoked && !r.expired))
    }

    async fn revoke_all(&self, principal_id: Uuid) -> Result<u64, AuthError> {
        let mut records = self.records.write().await;
        let mut revoked = 0u64;
        for record in records
            .iter_mut()
            .filter(|r| r.user_id == principal_id && !r.revoked && !r.expired)
        {
            record.revoked = true;
            record.expired = true;
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn revoke_one(&self, token: &str) -> Result<(), AuthError> {
        let mut records = self.records.write().await;
        if let Some(record) = records.iter_mut().find(|r| r.token == token) {
            record.revoked = true;
            record.expired = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use sprint_core::Role;

    #[tokio::test]
    async fn test_find_by_login_prefers_email() {
        let store = MemoryAccountStore::new();

        // 한 계정의 username이 다른 계정의 email과 충돌하는 경우
        let by_email = User::new("someone", "shared@example.com", "h", vec![Role::Developer]);
        let by_username = User::new("shared@example.com", "other@example.com", "h", vec![Role::Tester]);
        store.save(&by_email).await.unwrap();
        store.save(&by_username).await.unwrap();

        let found = store.find_by_login("shared@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, by_email.id);
    }

    #[tokio::test]
    async fn test_case_insensitive_lookups() {
        let store = MemoryAccountStore::new();
        let user = User::new("Alice", "alice@example.com", "h", vec![Role::Developer]);
        store.save(&user).await.unwrap();

        assert!(store.exists_by_username("ALICE").await.unwrap());
        assert!(store.exists_by_email("Alice@Example.Com").await.unwrap());
        assert!(store.find_by_login("aLiCe").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_verify_credentials_disabled_account() {
        let store = MemoryAccountStore::new();
        let mut user = User::new(
            "bob",
            "bob@example.com",
            hash_password("Secret123").unwrap(),
            vec![Role::Developer],
        );
        user.enabled = false;
        store.save(&user).await.unwrap();

        // 올바른 비밀번호라도 비활성 계정은 false
        assert!(!store
            .verify_credentials("bob@example.com", "Secret123")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_ledger_flags_move_together() {
        let store = MemoryTokenStore::new();
        let principal = Uuid::new_v4();

        store.record(principal, "token-1").await.unwrap();
        store.record(principal, "token-2").await.unwrap();
        assert_eq!(store.active_count(principal).await, 2);

        let revoked = store.revoke_all(principal).await.unwrap();
        assert_eq!(revoked, 2);
        assert_eq!(store.active_count(principal).await, 0);
        // 레코드는 삭제되지 않는다
        assert_eq!(store.record_count().await, 2);
        assert!(!store.is_active("token-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_one_leaves_others_active() {
        let store = MemoryTokenStore::new();
        let principal = Uuid::new_v4();

        store.record(principal, "token-1").await.unwrap();
        store.record(principal, "token-2").await.unwrap();

        store.revoke_one("token-1").await.unwrap();
        assert!(!store.is_active("token-1").await.unwrap());
        assert!(store.is_active("token-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_one_missing_token_is_noop() {
        let store = MemoryTokenStore::new();
        store.revoke_one("never-recorded").await.unwrap();
        assert_eq!(store.record_count().await, 0);
    }
}
