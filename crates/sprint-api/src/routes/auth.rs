//! 인증 엔드포인트.
//!
//! 세션 수명주기 서비스에 대한 얇은 HTTP 어댑터입니다. 요청 DTO 검증과
//! 와이어 형식 변환만 담당하고 비즈니스 규칙은 전부
//! [`AuthService`](crate::auth::AuthService)에 위임합니다.

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use sprint_core::{Role, User};

use crate::auth::{AdminUser, CreateUserInput, CurrentUser, RegisterInput, TokenPair};
use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::state::AppState;

// =====================================================
// 요청 DTO
// =====================================================

/// 계정 등록 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// 사용자명 (3자 이상)
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    /// 이메일
    #[validate(email)]
    pub email: String,
    /// 비밀번호 (8자 이상)
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// 이름
    pub first_name: Option<String>,
    /// 성
    pub last_name: Option<String>,
}

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// 로그인 식별자 (이메일 또는 사용자명)
    #[validate(length(min = 1))]
    pub login: String,
    /// 비밀번호
    #[validate(length(min = 1))]
    pub password: String,
}

/// 토큰 갱신 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Refresh token
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// 비밀번호 변경 요청.
///
/// 본인 변경 시 `oldPassword`가 필수이며, 관리자가 타인의 비밀번호를
/// 변경할 때는 생략 가능합니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// 현재 비밀번호
    pub old_password: Option<String>,
    /// 새 비밀번호 (8자 이상)
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// 강제 비밀번호 변경 요청 (비인증).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForcedPasswordChangeRequest {
    /// 계정 이메일
    #[validate(email)]
    pub email: String,
    /// 현재 비밀번호
    #[validate(length(min = 8, max = 128))]
    pub old_password: String,
    /// 새 비밀번호
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// 관리자의 계정 생성 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// 사용자명
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    /// 이메일
    #[validate(email)]
    pub email: String,
    /// 이름
    pub first_name: Option<String>,
    /// 성
    pub last_name: Option<String>,
    /// 부여할 역할 (비어 있으면 DEVELOPER)
    #[serde(default)]
    pub roles: Vec<Role>,
}

// =====================================================
// 응답 DTO
// =====================================================

/// 단순 성공 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    /// 결과 메시지
    pub message: String,
}

/// 비밀번호 재설정 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetResponse {
    /// 결과 메시지
    pub message: String,
    /// 부여된 임시 비밀번호
    pub temporary_password: String,
    /// 후속 조치 안내
    pub note: String,
}

/// 계정 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// 계정 ID
    pub id: Uuid,
    /// 사용자명
    pub username: String,
    /// 이메일
    pub email: String,
    /// 이름
    pub first_name: Option<String>,
    /// 성
    pub last_name: Option<String>,
    /// 보유 역할
    pub roles: Vec<Role>,
    /// 활성화 여부
    pub enabled: bool,
    /// 비밀번호 변경 게이트
    pub password_change_required: bool,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 수정 시각
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            roles: user.roles.clone(),
            enabled: user.enabled,
            password_change_required: user.password_change_required,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn validated<T: Validate>(payload: T) -> Result<T, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;
    Ok(payload)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

// =====================================================
// 핸들러
// =====================================================

/// 계정 등록.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "등록 성공, 토큰 쌍 반환", body = TokenPair),
        (status = 400, description = "입력 검증 실패", body = ApiErrorResponse),
        (status = 409, description = "사용자명/이메일 중복", body = ApiErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<TokenPair>> {
    let req = validated(req)?;
    let pair = state
        .auth
        .register(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;
    Ok(Json(pair))
}

/// 로그인.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공, 토큰 쌍 반환", body = TokenPair),
        (status = 401, description = "잘못된 자격증명", body = ApiErrorResponse),
        (status = 428, description = "비밀번호 변경 필요", body = ApiErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let req = validated(req)?;
    let pair = state.auth.login(&req.login, &req.password).await?;
    Ok(Json(pair))
}

/// 로그아웃.
///
/// 제시된 토큰 하나만 원장에서 폐기합니다.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "로그아웃 완료", body = SuccessResponse),
        (status = 401, description = "인증 필요", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SuccessResponse>> {
    state.auth.logout(bearer_token(&headers)).await?;
    Ok(Json(SuccessResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// 토큰 갱신.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "갱신 성공, 새 토큰 쌍 반환", body = TokenPair),
        (status = 401, description = "유효하지 않은 refresh token", body = ApiErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let req = validated(req)?;
    let pair = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(pair))
}

/// 본인 비밀번호 변경.
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "변경 완료", body = SuccessResponse),
        (status = 400, description = "현재 비밀번호 불일치", body = ApiErrorResponse),
        (status = 401, description = "인증 필요", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_own_password(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let req = validated(req)?;
    state
        .auth
        .change_password(
            ctx.user.id,
            req.old_password.as_deref(),
            &req.new_password,
            &ctx,
        )
        .await?;
    Ok(Json(SuccessResponse {
        message: "Password changed successfully".to_string(),
    }))
}

/// 타인 비밀번호 변경 (관리자 전용).
#[utoipa::path(
    post,
    path = "/api/auth/admin/users/{user_id}/change-password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    params(("user_id" = Uuid, Path, description = "대상 계정 ID")),
    responses(
        (status = 200, description = "변경 완료", body = SuccessResponse),
        (status = 403, description = "관리자 권한 필요", body = ApiErrorResponse),
        (status = 404, description = "계정 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_change_password(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let req = validated(req)?;
    state
        .auth
        .change_password(user_id, req.old_password.as_deref(), &req.new_password, &ctx)
        .await?;
    Ok(Json(SuccessResponse {
        message: "User password changed successfully".to_string(),
    }))
}

/// 비밀번호 재설정 (관리자 전용).
///
/// 대상 계정에 잘 알려진 임시 비밀번호를 부여하고 다음 로그인 전에
/// 강제 비밀번호 변경을 요구합니다.
#[utoipa::path(
    post,
    path = "/api/auth/admin/users/{user_id}/reset-password",
    tag = "auth",
    params(("user_id" = Uuid, Path, description = "대상 계정 ID")),
    responses(
        (status = 200, description = "재설정 완료", body = PasswordResetResponse),
        (status = 403, description = "관리자 권한 필요", body = ApiErrorResponse),
        (status = 404, description = "계정 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_reset_password(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<PasswordResetResponse>> {
    let temporary = state.auth.reset_password(user_id, &ctx).await?;
    Ok(Json(PasswordResetResponse {
        message: "Password reset successfully".to_string(),
        temporary_password: temporary.to_string(),
        note: "User will be required to change password on next login".to_string(),
    }))
}

/// 강제 비밀번호 변경 (비인증).
///
/// `passwordChangeRequired` 게이트가 설정된 계정만 사용할 수 있으며,
/// 성공 시 즉시 로그인된 토큰 쌍을 반환합니다.
#[utoipa::path(
    post,
    path = "/api/auth/forced-password-change",
    tag = "auth",
    request_body = ForcedPasswordChangeRequest,
    responses(
        (status = 200, description = "변경 완료, 토큰 쌍 반환", body = TokenPair),
        (status = 400, description = "게이트 미설정 또는 자격증명 불일치", body = ApiErrorResponse),
        (status = 404, description = "계정 없음", body = ApiErrorResponse)
    )
)]
pub async fn forced_password_change(
    State(state): State<AppState>,
    Json(req): Json<ForcedPasswordChangeRequest>,
) -> ApiResult<Json<TokenPair>> {
    let req = validated(req)?;
    let pair = state
        .auth
        .forced_password_change(&req.email, &req.old_password, &req.new_password)
        .await?;
    Ok(Json(pair))
}

/// 관리자의 계정 생성 (임시 비밀번호 부여).
#[utoipa::path(
    post,
    path = "/api/auth/admin/users",
    tag = "auth",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "생성 완료", body = UserResponse),
        (status = 403, description = "관리자 권한 필요", body = ApiErrorResponse),
        (status = 409, description = "사용자명/이메일 중복", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_create_user(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let req = validated(req)?;
    let user = state
        .auth
        .create_user_with_default_password(
            CreateUserInput {
                username: req.username,
                email: req.email,
                first_name: req.first_name,
                last_name: req.last_name,
                roles: req.roles,
            },
            &ctx,
        )
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

/// 전체 계정 목록 (관리자 전용).
#[utoipa::path(
    get,
    path = "/api/auth/admin/users",
    tag = "auth",
    responses(
        (status = 200, description = "계정 목록", body = [UserResponse]),
        (status = 403, description = "관리자 권한 필요", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_list_users(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.auth.list_users(&ctx).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// 현재 인증된 계정 조회.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "현재 계정", body = UserResponse),
        (status = 401, description = "인증 필요", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(CurrentUser(ctx): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&ctx.user))
}

/// 인증 라우터.
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/change-password", post(change_own_password))
        .route("/forced-password-change", post(forced_password_change))
        .route("/me", get(me))
        .route("/admin/users", post(admin_create_user).get(admin_list_users))
        .route(
            "/admin/users/{user_id}/change-password",
            post(admin_change_password),
        )
        .route(
            "/admin/users/{user_id}/reset-password",
            post(admin_reset_password),
        )
}
