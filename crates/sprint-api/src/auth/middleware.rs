//! 요청별 인증 필터.
//!
//! 보호된 모든 요청에 대해 한 번 실행되는 인증 결정 상태 기계입니다.
//! 종단 상태는 통과(공개 엔드포인트), 인증됨, 거부 세 가지입니다.
//!
//! 토큰이 유효하려면 암호학적 검증(서명/만료)과 원장의 활성 검사를
//! **모두** 통과해야 하며, 계정 상태(존재, 활성, 표준 식별자 일치)는
//! 클레임이 아닌 현재 계정 레코드를 기준으로 재검사합니다. 조회 실패나
//! 타임아웃 등 모호한 상황은 항상 거부로 처리합니다(fail-closed).
//!
//! 인증 결과는 프로세스 전역 상태가 아니라 요청 확장(request extension)에
//! 담겨 핸들러로 전달됩니다.

use std::collections::BTreeSet;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use sprint_core::{AccountStore, AuthError, TokenStore, User};

use crate::error::ApiError;
use crate::state::AppState;

use super::jwt::TokenCodec;

/// 인증 없이 접근 가능한 공개 엔드포인트.
///
/// `/**` 접미사는 해당 경로 아래 전체를 의미합니다.
pub const PUBLIC_ENDPOINTS: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/refresh",
    "/api/auth/forced-password-change",
    "/health",
    "/api-docs/**",
    "/swagger-ui/**",
];

/// 경로가 공개 엔드포인트 허용 목록과 일치하는지 검사.
pub fn is_public(path: &str) -> bool {
    PUBLIC_ENDPOINTS.iter().any(|pattern| {
        match pattern.strip_suffix("/**") {
            Some(prefix) => {
                path == prefix
                    || (path.starts_with(prefix)
                        && path.as_bytes().get(prefix.len()) == Some(&b'/'))
            }
            None => path == *pattern,
        }
    })
}

/// 인증된 요청 컨텍스트.
///
/// 현재 계정 레코드와 역할 모델에서 계산된 유효 권한 집합을 담습니다.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// 인증된 계정 (요청 시점에 저장소에서 재조회된 상태)
    pub user: User,
    /// 유효 권한 집합 (권한 능력 문자열 + `ROLE_<이름>` 태그)
    pub authorities: BTreeSet<String>,
    /// 제시된 access token 원문
    pub token: String,
}

impl AuthContext {
    /// 특정 권한 보유 여부.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// 관리자 권한 보유 여부.
    pub fn is_admin(&self) -> bool {
        self.has_authority("ROLE_ADMIN")
    }
}

/// 인증 결정 결과.
#[derive(Debug, Clone)]
pub enum AuthDecision {
    /// 공개 엔드포인트 - 인증을 시도하지 않음
    PassedThrough,
    /// 인증 성공
    Authenticated(AuthContext),
}

/// 요청 헤더와 경로에 대한 인증 결정.
///
/// 결정 단계:
/// 1. 공개 엔드포인트면 통과
/// 2. `Authorization: Bearer <token>` 헤더 필수
/// 3. 토큰 암호학적 검증 (서명 → 만료)
/// 4. subject로 계정 재조회 (삭제된 계정의 고아 토큰은 거부)
/// 5. 원장 활성 검사
/// 6. subject와 현재 표준 로그인 식별자(이메일) 일치 확인
/// 7. 계정 활성(enabled) 확인
///
/// 4단계 이후의 실패는 정보 유출을 피하기 위해 동일한 메시지로
/// 거부됩니다.
pub async fn authenticate(
    accounts: &dyn AccountStore,
    tokens: &dyn TokenStore,
    codec: &TokenCodec,
    headers: &HeaderMap,
    path: &str,
) -> Result<AuthDecision, AuthError> {
    if is_public(path) {
        debug!(path, "Public endpoint, skipping authentication");
        return Ok(AuthDecision::PassedThrough);
    }

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AuthError::unauthorized("Missing or invalid authorization token"))?;

    let claims = codec
        .verify_access(token)
        .map_err(|e| {
            debug!(path, error = %e, "Token verification failed");
            AuthError::unauthorized("Invalid or expired token")
        })?;

    let user = accounts
        .find_by_login(&claims.sub)
        .await?
        .ok_or_else(|| AuthError::unauthorized("Invalid or expired token"))?;

    if !tokens.is_active(token).await? {
        return Err(AuthError::unauthorized("Invalid or expired token"));
    }

    // 토큰 발급 이후 로그인 식별자가 바뀐 계정의 토큰은 무효
    if claims.sub != user.email {
        return Err(AuthError::unauthorized("Invalid or expired token"));
    }

    // 비활성 계정의 토큰은 원장 상태와 무관하게 거부
    if !user.enabled {
        return Err(AuthError::unauthorized("Invalid or expired token"));
    }

    let authorities = user.authorities();
    debug!(username = %user.username, ?authorities, "Request authenticated");

    Ok(AuthDecision::Authenticated(AuthContext {
        user,
        authorities,
        token: token.to_string(),
    }))
}

/// Axum 인증 미들웨어.
///
/// 인증 성공 시 [`AuthContext`]를 요청 확장에 삽입합니다.
/// 이미 인증 컨텍스트가 붙어 있으면 재검사하지 않습니다.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if req.extensions().get::<AuthContext>().is_some() {
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();
    let decision = authenticate(
        state.accounts.as_ref(),
        state.tokens.as_ref(),
        &state.codec,
        req.headers(),
        &path,
    )
    .await;

    match decision {
        Ok(AuthDecision::PassedThrough) => next.run(req).await,
        Ok(AuthDecision::Authenticated(ctx)) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(AuthError::Store(e)) => {
            // 저장소 실패는 인증 성공으로 이어질 수 없다
            warn!(path, error = %e, "Store failure during authentication");
            ApiError::from(AuthError::unauthorized("Invalid or expired token")).into_response()
        }
        Err(err) => {
            warn!(path, error = %err, "Request rejected");
            ApiError::from(err).into_response()
        }
    }
}

/// 인증된 계정 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn me(CurrentUser(ctx): CurrentUser) -> impl IntoResponse {
///     Json(UserResponse::from(&ctx.user))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                ApiError::from(AuthError::unauthorized(
                    "Missing or invalid authorization token",
                ))
            })
    }
}

/// 관리자 권한을 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthContext);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(ctx) = CurrentUser::from_request_parts(parts, state).await?;
        if !ctx.is_admin() {
            return Err(ApiError::from(AuthError::forbidden(
                "Administrator role required",
            )));
        }
        Ok(AdminUser(ctx))
    }
}
