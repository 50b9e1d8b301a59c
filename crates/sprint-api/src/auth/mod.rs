//! 인증 및 권한 부여.
//!
//! JWT 기반 인증, 서버 측 토큰 원장, 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`SigningKeys`]: 설정된 비밀 키에서 서명 키 자재 파생
//! - [`TokenCodec`]: access/refresh 토큰 발급 및 검증
//! - [`AuthService`]: 세션 수명주기 (register, login, logout, 비밀번호 변경)
//! - [`authenticate`] / [`require_auth`]: 요청별 인증 필터
//! - [`CurrentUser`] / [`AdminUser`]: 핸들러용 인증 컨텍스트 추출기
//!
//! 토큰은 암호학적 검증과 원장의 활성 검사를 **모두** 통과해야 유효합니다.

pub mod jwt;
pub mod keys;
pub mod middleware;
pub mod password;
pub mod service;

pub use jwt::{Claims, JwtError, RefreshClaims, TokenCodec, TokenPair};
pub use keys::{KeyError, SigningKeys};
pub use middleware::{
    authenticate, require_auth, AdminUser, AuthContext, AuthDecision, CurrentUser,
    PUBLIC_ENDPOINTS,
};
pub use password::{hash_password, verify_password, PasswordError};
pub use service::{AuthService, CreateUserInput, RegisterInput, TEMP_PASSWORD};
