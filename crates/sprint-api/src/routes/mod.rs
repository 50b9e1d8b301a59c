//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//! 라우팅 계층은 얇게 유지되며 모든 불변 조건은
//! [`AuthService`](crate::auth::AuthService)에 있습니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크
//! - `/api/auth/register`, `/api/auth/login`, `/api/auth/refresh`,
//!   `/api/auth/forced-password-change` - 공개 엔드포인트
//! - `/api/auth/logout`, `/api/auth/change-password`, `/api/auth/me` -
//!   인증 필요
//! - `/api/auth/admin/**` - 관리자 전용

pub mod auth;
pub mod health;

pub use auth::{
    auth_router, ChangePasswordRequest, CreateUserRequest, ForcedPasswordChangeRequest,
    LoginRequest, PasswordResetResponse, RefreshRequest, RegisterRequest, SuccessResponse,
    UserResponse,
};
pub use health::{health_router, HealthResponse};

use axum::middleware;
use axum::Router;

use crate::auth::require_auth;
use crate::openapi::swagger_ui_router;
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 인증 미들웨어가 모든 라우트에 적용되며, 공개 엔드포인트 허용 목록에
/// 있는 경로(Swagger UI 포함)는 미들웨어 안에서 통과됩니다.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .merge(health_router())
        .merge(swagger_ui_router())
        .nest("/api/auth", auth_router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}
