//! 스프린트 플랫폼 인증 API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 서명 키 자재 파생 (HEX | Base64 | 원시 UTF-8 비밀 키)
//! - JWT 발급/검증 (access + refresh)
//! - 서버 측 토큰 원장 (로그아웃/강제 재설정 시 폐기)
//! - 요청별 인증 필터 및 역할 기반 권한 계산
//! - 세션 수명주기 서비스 (register/login/logout/비밀번호 변경/강제 변경)
//! - Axum 기반 REST API
//!
//! # 모듈 구성
//!
//! - [`auth`]: 키 자재, 토큰 코덱, 인증 필터, 세션 수명주기
//! - [`repository`]: PostgreSQL 및 인메모리 저장소 구현
//! - [`routes`]: REST API 엔드포인트
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`error`]: 통합 API 에러 응답
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{
    authenticate, hash_password, verify_password, AuthContext, AuthService, Claims,
    RefreshClaims, SigningKeys, TokenCodec, TokenPair,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use routes::create_api_router;
pub use state::AppState;
