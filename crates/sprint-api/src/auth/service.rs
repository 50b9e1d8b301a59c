//! 세션 수명주기 서비스.
//!
//! 등록, 로그인, 로그아웃, 비밀번호 변경/재설정, 강제 비밀번호 변경,
//! 토큰 갱신을 조율합니다. 비즈니스 불변 조건(단일 활성 세션, 비밀번호
//! 변경 게이트)은 전부 이 계층에 있습니다.
//!
//! 로그인/재설정/변경 한 호출 안에서 "이전 세션 폐기 → 새 토큰 발급/기록"은
//! 순차 실행되므로 새 토큰이 자신의 발급 연산에 폐기되지 않습니다. 동일
//! 계정에 대한 동시 로그인은 각자 폐기-후-발급을 수행하는 last-write-wins
//! 경쟁이며, 정확히 하나의 토큰만 활성으로 남습니다(허용된 동작).

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use sprint_core::{AccountStore, AuthError, Role, TokenStore, User};

use super::jwt::{TokenCodec, TokenPair};
use super::middleware::AuthContext;
use super::password::{hash_password, verify_password};

/// 관리자 재설정 시 부여되는 잘 알려진 임시 비밀번호.
pub const TEMP_PASSWORD: &str = "kamer237";

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

/// 계정 등록 입력.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// 사용자명 (3자 이상)
    pub username: String,
    /// 이메일 (소문자로 정규화됨)
    pub email: String,
    /// 평문 비밀번호 (8자 이상)
    pub password: String,
    /// 이름
    pub first_name: Option<String>,
    /// 성
    pub last_name: Option<String>,
}

/// 관리자의 계정 생성 입력 (임시 비밀번호 부여).
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// 사용자명
    pub username: String,
    /// 이메일
    pub email: String,
    /// 이름
    pub first_name: Option<String>,
    /// 성
    pub last_name: Option<String>,
    /// 부여할 역할 (비어 있으면 DEVELOPER)
    pub roles: Vec<Role>,
}

/// 세션 수명주기 서비스.
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<dyn TokenStore>,
    codec: TokenCodec,
}

impl AuthService {
    /// 새 서비스 생성.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<dyn TokenStore>,
        codec: TokenCodec,
    ) -> Self {
        Self {
            accounts,
            tokens,
            codec,
        }
    }

    /// 토큰 쌍 발급 후 access token을 원장에 기록.
    async fn issue_and_record(&self, user: &User) -> Result<TokenPair, AuthError> {
        let pair = self
            .codec
            .issue_pair(user)
            .map_err(|e| AuthError::store(format!("token issuance failed: {}", e)))?;
        self.tokens.record(user.id, &pair.access_token).await?;
        Ok(pair)
    }

    /// 이전 세션 전부 폐기 후 새 토큰 쌍 발급/기록.
    ///
    /// 단일 활성 세션 정책: 폐기와 기록이 이 순서로 한 호출 안에서
    /// 수행됩니다.
    async fn rotate_sessions(&self, user: &User) -> Result<TokenPair, AuthError> {
        let revoked = self.tokens.revoke_all(user.id).await?;
        if revoked > 0 {
            info!(username = %user.username, revoked, "Previous sessions revoked");
        }
        self.issue_and_record(user).await
    }

    /// 계정 등록.
    ///
    /// 기본 역할은 DEVELOPER이며 게이트 없이 활성 상태로 생성됩니다.
    /// 등록 즉시 토큰 쌍이 발급됩니다.
    pub async fn register(&self, input: RegisterInput) -> Result<TokenPair, AuthError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();

        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AuthError::bad_request(
                "Username must be at least 3 characters",
            ));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::bad_request(
                "Password must be at least 8 characters",
            ));
        }
        if self.accounts.exists_by_username(&username).await? {
            return Err(AuthError::conflict("Username already exists"));
        }
        if self.accounts.exists_by_email(&email).await? {
            return Err(AuthError::conflict("Email already used"));
        }

        let hash = hash_password(&input.password)
            .map_err(|e| AuthError::store(format!("password hashing failed: {}", e)))?;
        let mut user = User::new(username, email, hash, vec![Role::Developer]);
        user.first_name = input.first_name;
        user.last_name = input.last_name;

        self.accounts.save(&user).await?;
        info!(username = %user.username, "Account registered");

        self.issue_and_record(&user).await
    }

    /// 로그인.
    ///
    /// 자격증명 검증은 계정 저장소에 위임합니다. 게이트가 설정된 계정은
    /// 어떤 토큰 부수효과도 없이 구분 가능한 에러로 실패합니다. 성공 시
    /// 이전 세션이 전부 폐기됩니다(단일 활성 세션 정책).
    pub async fn login(&self, login: &str, password: &str) -> Result<TokenPair, AuthError> {
        let login = login.trim();

        if !self.accounts.verify_credentials(login, password).await? {
            // 계정 존재 여부를 구분하지 않는다 (계정 열거 방지)
            return Err(AuthError::unauthorized("Invalid credentials"));
        }

        let user = self
            .accounts
            .find_by_login(login)
            .await?
            .ok_or_else(|| AuthError::unauthorized("Invalid credentials"))?;

        if user.password_change_required {
            warn!(username = %user.username, "Login blocked: password change required");
            return Err(AuthError::PasswordChangeRequired);
        }

        let pair = self.rotate_sessions(&user).await?;
        info!(username = %user.username, "Login succeeded");
        Ok(pair)
    }

    /// 로그아웃.
    ///
    /// 제시된 토큰 하나만 폐기합니다. 토큰이 없으면 아무 동작도 하지
    /// 않습니다. 인증 컨텍스트는 요청 범위이므로 요청 종료와 함께
    /// 소멸합니다.
    pub async fn logout(&self, presented_token: Option<&str>) -> Result<(), AuthError> {
        let Some(token) = presented_token else {
            return Ok(());
        };
        self.tokens.revoke_one(token).await?;
        info!("Session token revoked");
        Ok(())
    }

    /// 비밀번호 변경 (본인 또는 관리자).
    ///
    /// 본인 변경은 현재 비밀번호 확인이 필요하고 게이트를 남기지
    /// 않습니다. 관리자가 타인의 비밀번호를 변경하면 대상 계정은 다음
    /// 로그인 때 반드시 비밀번호를 다시 변경해야 합니다. 어느 경우든
    /// 대상 계정의 모든 세션이 폐기됩니다.
    pub async fn change_password(
        &self,
        target_id: Uuid,
        old_password: Option<&str>,
        new_password: &str,
        actor: &AuthContext,
    ) -> Result<(), AuthError> {
        let is_self = actor.user.id == target_id;
        if !is_self && !actor.is_admin() {
            return Err(AuthError::forbidden(
                "You can only change your own password",
            ));
        }

        let mut user = self
            .accounts
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::not_found("User not found"))?;

        if is_self {
            let old = old_password
                .ok_or_else(|| AuthError::bad_request("Current password is required"))?;
            if verify_password(old, &user.password_hash).is_err() {
                return Err(AuthError::bad_request("Current password is incorrect"));
            }
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::bad_request(
                "New password must be at least 8 characters",
            ));
        }

        user.password_hash = hash_password(new_password)
            .map_err(|e| AuthError::store(format!("password hashing failed: {}", e)))?;
        user.password_change_required = !is_self;
        user.updated_at = chrono::Utc::now();
        self.accounts.save(&user).await?;

        self.tokens.revoke_all(user.id).await?;
        info!(username = %user.username, is_self, "Password changed, sessions revoked");
        Ok(())
    }

    /// 비밀번호 재설정 (관리자 전용).
    ///
    /// 잘 알려진 임시 비밀번호를 부여하고 게이트를 설정합니다.
    ///
    /// # Returns
    ///
    /// 부여된 임시 비밀번호.
    pub async fn reset_password(
        &self,
        target_id: Uuid,
        actor: &AuthContext,
    ) -> Result<&'static str, AuthError> {
        if !actor.is_admin() {
            return Err(AuthError::forbidden(
                "Only administrators can reset passwords",
            ));
        }

        let mut user = self
            .accounts
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::not_found("User not found"))?;

        user.password_hash = hash_password(TEMP_PASSWORD)
            .map_err(|e| AuthError::store(format!("password hashing failed: {}", e)))?;
        user.password_change_required = true;
        user.updated_at = chrono::Utc::now();
        self.accounts.save(&user).await?;

        self.tokens.revoke_all(user.id).await?;
        info!(username = %user.username, "Password reset, sessions revoked");
        Ok(TEMP_PASSWORD)
    }

    /// 강제 비밀번호 변경 (비인증 진입점).
    ///
    /// 게이트가 설정된 계정이 관리자 개입 없이 게이트를 해제할 수 있는
    /// 유일한 경로입니다. 게이트가 설정되지 않은 계정에는 자격증명이
    /// 맞더라도 BadRequest로 실패하여 일반 비인증 비밀번호 변경 통로로
    /// 악용되는 것을 막습니다. 성공 시 즉시 로그인된 토큰 쌍을
    /// 반환합니다.
    pub async fn forced_password_change(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<TokenPair, AuthError> {
        let mut user = self
            .accounts
            .find_by_login(email.trim())
            .await?
            .ok_or_else(|| AuthError::not_found("User not found"))?;

        if !user.password_change_required {
            return Err(AuthError::bad_request("Password change not required"));
        }
        if verify_password(old_password, &user.password_hash).is_err() {
            return Err(AuthError::bad_request("Current password is incorrect"));
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::bad_request(
                "New password must be at least 8 characters",
            ));
        }

        user.password_hash = hash_password(new_password)
            .map_err(|e| AuthError::store(format!("password hashing failed: {}", e)))?;
        user.password_change_required = false;
        user.updated_at = chrono::Utc::now();
        self.accounts.save(&user).await?;

        let pair = self.rotate_sessions(&user).await?;
        info!(username = %user.username, "Forced password change completed");
        Ok(pair)
    }

    /// 토큰 갱신.
    ///
    /// 유효한 refresh token을 새 토큰 쌍으로 교환합니다. 갱신도 세션
    /// 회전이므로 이전 access token은 폐기됩니다.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .codec
            .verify_refresh(refresh_token)
            .map_err(|_| AuthError::unauthorized("Invalid or expired token"))?;

        let user = self
            .accounts
            .find_by_login(&claims.sub)
            .await?
            .ok_or_else(|| AuthError::unauthorized("Invalid or expired token"))?;

        if !user.enabled {
            return Err(AuthError::unauthorized("Invalid or expired token"));
        }
        if user.password_change_required {
            return Err(AuthError::PasswordChangeRequired);
        }

        self.rotate_sessions(&user).await
    }

    /// 관리자의 계정 생성 (임시 비밀번호 부여).
    ///
    /// 생성된 계정은 게이트가 설정되어 첫 로그인 전에 강제 비밀번호
    /// 변경을 거쳐야 합니다.
    pub async fn create_user_with_default_password(
        &self,
        input: CreateUserInput,
        actor: &AuthContext,
    ) -> Result<User, AuthError> {
        if !actor.is_admin() {
            return Err(AuthError::forbidden("Administrator role required"));
        }

        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();

        if self.accounts.exists_by_username(&username).await? {
            return Err(AuthError::conflict("Username already exists"));
        }
        if self.accounts.exists_by_email(&email).await? {
            return Err(AuthError::conflict("Email already used"));
        }

        let roles = if input.roles.is_empty() {
            vec![Role::Developer]
        } else {
            input.roles
        };
        let hash = hash_password(TEMP_PASSWORD)
            .map_err(|e| AuthError::store(format!("password hashing failed: {}", e)))?;
        let mut user = User::new(username, email, hash, roles);
        user.first_name = input.first_name;
        user.last_name = input.last_name;
        user.password_change_required = true;

        self.accounts.save(&user).await?;
        info!(username = %user.username, "Account created with temporary password");
        Ok(user)
    }

    /// 전체 계정 목록 (관리자 전용).
    pub async fn list_users(&self, actor: &AuthContext) -> Result<Vec<User>, AuthError> {
        if !actor.is_admin() {
            return Err(AuthError::forbidden("Administrator role required"));
        }
        self.accounts.list().await
    }
}
