//! 인증 시스템의 에러 타입.
//!
//! 이 모듈은 인증/권한 처리 전반에서 사용되는 에러 분류 체계를 정의합니다.
//! 각 변형은 호출자에게 전달 가능한 사용자 안전(user-safe) 메시지를 담습니다.
//! 로그인 과정의 계정 존재 여부는 계정 열거(enumeration) 방지를 위해
//! 일반화된 메시지로만 노출됩니다.

use thiserror::Error;

/// 인증/권한 에러.
///
/// HTTP 계층은 이 분류를 상태 코드로 변환합니다
/// (Unauthorized → 401, Forbidden → 403, BadRequest → 400,
/// Conflict → 409, NotFound → 404, PasswordChangeRequired → 428).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// 인증 실패 (토큰 누락/무효/만료/폐기, 잘못된 자격증명)
    #[error("{0}")]
    Unauthorized(String),

    /// 인증됐지만 권한 부족
    #[error("{0}")]
    Forbidden(String),

    /// 잘못된 입력 또는 게이트 위반
    #[error("{0}")]
    BadRequest(String),

    /// 사용자명/이메일 중복
    #[error("{0}")]
    Conflict(String),

    /// 존재하지 않는 계정
    #[error("{0}")]
    NotFound(String),

    /// 비밀번호 변경 게이트가 설정된 계정의 로그인 시도
    #[error("PASSWORD_CHANGE_REQUIRED")]
    PasswordChangeRequired,

    /// 저장소(계정/토큰) 접근 실패
    #[error("Store error: {0}")]
    Store(String),
}

impl AuthError {
    /// 인증 실패 에러 생성.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// 권한 부족 에러 생성.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// 잘못된 요청 에러 생성.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// 중복 충돌 에러 생성.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// 미존재 에러 생성.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// 저장소 에러 생성.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// 기계 판독용 에러 코드 반환.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Unauthorized(_) => "UNAUTHORIZED",
            AuthError::Forbidden(_) => "FORBIDDEN",
            AuthError::BadRequest(_) => "BAD_REQUEST",
            AuthError::Conflict(_) => "CONFLICT",
            AuthError::NotFound(_) => "NOT_FOUND",
            AuthError::PasswordChangeRequired => "PASSWORD_CHANGE_REQUIRED",
            AuthError::Store(_) => "STORE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::unauthorized("x").code(), "UNAUTHORIZED");
        assert_eq!(AuthError::forbidden("x").code(), "FORBIDDEN");
        assert_eq!(AuthError::bad_request("x").code(), "BAD_REQUEST");
        assert_eq!(AuthError::conflict("x").code(), "CONFLICT");
        assert_eq!(AuthError::not_found("x").code(), "NOT_FOUND");
        assert_eq!(
            AuthError::PasswordChangeRequired.code(),
            "PASSWORD_CHANGE_REQUIRED"
        );
        assert_eq!(AuthError::store("x").code(), "STORE_ERROR");
    }

    #[test]
    fn test_display_is_message() {
        let err = AuthError::unauthorized("Invalid or expired token");
        assert_eq!(err.to_string(), "Invalid or expired token");

        // 게이트 에러는 원본 구현과 동일한 식별자 메시지를 사용
        assert_eq!(
            AuthError::PasswordChangeRequired.to_string(),
            "PASSWORD_CHANGE_REQUIRED"
        );
    }
}
