//! JWT 토큰 코덱.
//!
//! Access/Refresh 토큰의 발급 및 검증을 담당합니다. 저장소와 독립적인
//! 순수 암호화 계층이며, 원장의 활성 검사는 인증 필터에서 별도로
//! 수행됩니다.
//!
//! Access token은 클라이언트 편의를 위한 애플리케이션 클레임 백
//! (사용자명, 이메일, 이름, 활성 여부, 역할, 계정 ID, 생성 시각)을
//! 담지만, 권한 판단의 근거는 항상 요청 시점에 다시 읽는 계정 레코드이며
//! 클레임은 식별 용도로만 신뢰됩니다. Refresh token은 요청 권한 부여에
//! 직접 사용되지 않으므로 subject/발급/만료 시각만 담습니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use sprint_core::{Role, User};

use super::keys::SigningKeys;

/// JWT Access Token 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 표준 로그인 식별자 (소문자 정규화된 이메일)
    pub sub: String,
    /// Issued At - 토큰 발급 시간 (Unix timestamp, 초)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp, 초)
    pub exp: i64,
    /// 사용자명
    pub username: String,
    /// 이메일
    pub email: String,
    /// 이름
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// 성
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// 발급 시점의 활성 여부 (캐시 값, 권한 판단에는 사용하지 않음)
    pub enabled: bool,
    /// 발급 시점의 역할 이름 목록 (캐시 값)
    pub roles: Vec<Role>,
    /// 계정 ID
    pub user_id: Uuid,
    /// 계정 생성 시각 (epoch millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl Claims {
    /// 계정 레코드로부터 access token 클레임 생성.
    pub fn for_user(user: &User, ttl_ms: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::milliseconds(ttl_ms)).timestamp(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            enabled: user.enabled,
            roles: user.roles.clone(),
            user_id: user.id,
            created_at: Some(user.created_at.timestamp_millis()),
        }
    }
}

/// Refresh Token 페이로드.
///
/// 애플리케이션 클레임 백 없이 subject와 시간 정보만 담습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - 표준 로그인 식별자
    pub sub: String,
    /// Issued At
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// 토큰 종류 (항상 "refresh")
    pub token_type: String,
}

impl RefreshClaims {
    /// 계정 레코드로부터 refresh token 클레임 생성.
    pub fn for_user(user: &User, ttl_ms: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::milliseconds(ttl_ms)).timestamp(),
            token_type: "refresh".to_string(),
        }
    }
}

/// Access Token + Refresh Token 쌍.
///
/// 로그인/등록/갱신 응답의 와이어 형식입니다.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
}

/// 토큰 코덱 에러.
#[derive(Debug, Error)]
pub enum JwtError {
    /// 만료된 토큰
    #[error("Token expired")]
    Expired,

    /// 서명 불일치
    #[error("Invalid token signature")]
    InvalidSignature,

    /// 형식 오류 (구조/클레임 불일치 포함)
    #[error("Malformed token")]
    Malformed,

    /// 인코딩 실패
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// JWT 토큰 코덱.
///
/// 서명 키와 두 가지 TTL 클래스(access/refresh, 밀리초)를 보유합니다.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: SigningKeys,
    access_ttl_ms: i64,
    refresh_ttl_ms: i64,
}

impl TokenCodec {
    /// 새 토큰 코덱 생성.
    pub fn new(keys: SigningKeys, access_ttl_ms: i64, refresh_ttl_ms: i64) -> Self {
        Self {
            keys,
            access_ttl_ms,
            refresh_ttl_ms,
        }
    }

    /// Access token 발급.
    pub fn issue_access(&self, user: &User) -> Result<String, JwtError> {
        let claims = Claims::for_user(user, self.access_ttl_ms);
        encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding())
            .map_err(|e| JwtError::Encoding(e.to_string()))
    }

    /// Refresh token 발급.
    pub fn issue_refresh(&self, user: &User) -> Result<String, JwtError> {
        let claims = RefreshClaims::for_user(user, self.refresh_ttl_ms);
        encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding())
            .map_err(|e| JwtError::Encoding(e.to_string()))
    }

    /// Access + Refresh 토큰 쌍 발급.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue_access(user)?,
            refresh_token: self.issue_refresh(user)?,
        })
    }

    /// Access token 검증 및 클레임 추출.
    ///
    /// 서명 검증이 먼저 수행되고 그다음 만료가 검사됩니다.
    pub fn verify_access(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, self.keys.decoding(), &self.validation())
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    /// Refresh token 검증 및 클레임 추출.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        decode::<RefreshClaims>(token, self.keys.decoding(), &self.validation())
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // 만료 판정에 유예 시간을 두지 않는다 (exp < now ⇒ Expired)
        validation.leeway = 0;
        validation
    }
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> JwtError {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        _ => JwtError::Malformed,
    }
}
