//! 계정(Principal) 모델.
//!
//! 계정 데이터의 소유자는 외부 계정 저장소이며, 인증 코어는
//! 비밀번호 해시와 `password_change_required` 게이트만 변경합니다.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::{authorities_of, Role};

/// 인증 가능한 계정.
///
/// # 불변 조건
/// - `username`과 `email`은 각각 대소문자 무시 비교 기준으로 전역 유일하다
///   (저장소가 강제).
/// - `roles`는 비어 있지 않다.
/// - `email`은 소문자로 정규화되어 저장되며 토큰의 표준(canonical)
///   로그인 식별자로 사용된다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// 고유 식별자
    pub id: Uuid,
    /// 로그인 식별자 (대소문자 무시 유일)
    pub username: String,
    /// 로그인 식별자 (대소문자 무시 유일, 소문자 정규화)
    pub email: String,
    /// Argon2 PHC 형식 비밀번호 해시
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// 이름
    pub first_name: Option<String>,
    /// 성
    pub last_name: Option<String>,
    /// 보유 역할
    pub roles: Vec<Role>,
    /// 활성화 여부 (비활성 계정은 인증 불가)
    pub enabled: bool,
    /// 비밀번호 변경 게이트 (설정 시 일반 로그인 차단)
    pub password_change_required: bool,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 수정 시각
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 새 계정 생성.
    ///
    /// `email`은 소문자로 정규화됩니다.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        roles: Vec<Role>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            first_name: None,
            last_name: None,
            roles,
            enabled: true,
            password_change_required: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// 계정의 유효 권한 집합 계산.
    ///
    /// 보유 역할의 권한 합집합 + 역할별 `ROLE_<이름>` 태그.
    pub fn authorities(&self) -> BTreeSet<String> {
        authorities_of(&self.roles)
    }

    /// 관리자 역할 보유 여부.
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_normalizes_email() {
        let user = User::new("alice", "Alice@Example.COM", "$argon2id$...", vec![Role::Developer]);
        assert_eq!(user.email, "alice@example.com");
        assert!(user.enabled);
        assert!(!user.password_change_required);
    }

    #[test]
    fn test_user_authorities_union() {
        let user = User::new(
            "bob",
            "bob@example.com",
            "$argon2id$...",
            vec![Role::ScrumMaster, Role::Developer],
        );
        let authorities = user.authorities();
        assert!(authorities.contains("ROLE_SCRUM_MASTER"));
        assert!(authorities.contains("ROLE_DEVELOPER"));
        assert!(authorities.contains("sprint:create"));
        assert!(authorities.contains("goal:read"));
    }

    #[test]
    fn test_is_admin() {
        let admin = User::new("root", "root@example.com", "h", vec![Role::Admin]);
        let dev = User::new("dev", "dev@example.com", "h", vec![Role::Developer]);
        assert!(admin.is_admin());
        assert!(!dev.is_admin());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("carol", "carol@example.com", "secret-hash", vec![Role::Tester]);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
