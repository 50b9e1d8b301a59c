//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능하며, 두 경로 모두
//! 인증 필터의 공개 엔드포인트 허용 목록에 포함됩니다.

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::TokenPair;
use crate::error::ApiErrorResponse;
use crate::routes::{
    ChangePasswordRequest, CreateUserRequest, ForcedPasswordChangeRequest, HealthResponse,
    LoginRequest, PasswordResetResponse, RefreshRequest, RegisterRequest, SuccessResponse,
    UserResponse,
};
use crate::state::AppState;

/// Bearer 토큰 보안 스키마 등록.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Sprint 인증 API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sprint Platform Auth API",
        description = r#"
# 스프린트 플랫폼 인증 API

계정 등록/로그인, 토큰 수명주기, 비밀번호 변경 흐름을 제공합니다.

## 인증

보호된 엔드포인트는 `Authorization: Bearer <token>` 헤더가 필요합니다.
토큰은 서명/만료 검증과 서버 측 원장의 활성 검사를 모두 통과해야 합니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "Sprint Platform Team", url = "https://github.com/user/sprintplus")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 계정/세션/비밀번호 관리")
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::refresh,
        crate::routes::auth::change_own_password,
        crate::routes::auth::admin_change_password,
        crate::routes::auth::admin_reset_password,
        crate::routes::auth::forced_password_change,
        crate::routes::auth::admin_create_user,
        crate::routes::auth::admin_list_users,
        crate::routes::auth::me,
    ),
    components(
        schemas(
            HealthResponse,
            ApiErrorResponse,
            TokenPair,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            ChangePasswordRequest,
            ForcedPasswordChangeRequest,
            CreateUserRequest,
            SuccessResponse,
            PasswordResetResponse,
            UserResponse,
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Swagger UI 라우터.
///
/// `/swagger-ui`에서 UI를, `/api-docs/openapi.json`에서 스펙을 제공합니다.
pub fn swagger_ui_router() -> Router<AppState> {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_includes_auth_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/auth/login"));
        assert!(paths.contains_key("/api/auth/register"));
        assert!(paths.contains_key("/api/auth/forced-password-change"));
        assert!(paths.contains_key("/api/auth/admin/users/{user_id}/reset-password"));
    }
}
