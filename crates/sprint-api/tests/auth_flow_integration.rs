//! 인증 수명주기 통합 테스트.
//!
//! 인메모리 저장소 위에서 등록 → 로그인 → 세션 회전 → 요청 인증 →
//! 비밀번호 변경/재설정/강제 변경의 전체 흐름을 검증합니다.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use sprint_api::auth::{
    authenticate, AuthContext, AuthService, SigningKeys, TokenCodec, TEMP_PASSWORD,
};
use sprint_api::repository::memory::{MemoryAccountStore, MemoryTokenStore};
use sprint_core::{AccountStore, AuthError, Role, User};

struct World {
    accounts: Arc<MemoryAccountStore>,
    tokens: Arc<MemoryTokenStore>,
    codec: TokenCodec,
    service: AuthService,
}

fn world() -> World {
    let keys = SigningKeys::from_secret(&"00".repeat(32)).unwrap();
    let codec = TokenCodec::new(keys, 60_000, 604_800_000);
    let accounts = Arc::new(MemoryAccountStore::new());
    let tokens = Arc::new(MemoryTokenStore::new());
    let service = AuthService::new(accounts.clone(), tokens.clone(), codec.clone());
    World {
        accounts,
        tokens,
        codec,
        service,
    }
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
    headers
}

async fn register_alice(w: &World) -> sprint_api::auth::TokenPair {
    w.service
        .register(sprint_api::auth::RegisterInput {
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "Secret123".to_string(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap()
}

fn admin_ctx(user: &User) -> AuthContext {
    AuthContext {
        user: user.clone(),
        authorities: user.authorities(),
        token: String::new(),
    }
}

#[tokio::test]
async fn register_login_relogin_scenario() {
    let w = world();

    // 등록 후 로그인하면 토큰 쌍을 받는다
    register_alice(&w).await;
    let first = w.service.login("alice@x.com", "Secret123").await.unwrap();

    // 첫 토큰으로 요청 인증 가능
    let decision = authenticate(
        w.accounts.as_ref(),
        w.tokens.as_ref(),
        &w.codec,
        &bearer(&first.access_token),
        "/api/tasks",
    )
    .await
    .unwrap();
    assert!(matches!(
        decision,
        sprint_api::auth::middleware::AuthDecision::Authenticated(_)
    ));

    // 두 번째 로그인은 첫 토큰을 폐기한다
    let second = w.service.login("alice@x.com", "Secret123").await.unwrap();

    let err = authenticate(
        w.accounts.as_ref(),
        w.tokens.as_ref(),
        &w.codec,
        &bearer(&first.access_token),
        "/api/tasks",
    )
    .await
    .unwrap_err();
    assert_eq!(err, AuthError::unauthorized("Invalid or expired token"));

    // 새 토큰은 유효하고, 활성 세션은 정확히 하나
    authenticate(
        w.accounts.as_ref(),
        w.tokens.as_ref(),
        &w.codec,
        &bearer(&second.access_token),
        "/api/tasks",
    )
    .await
    .unwrap();
    let user = w.accounts.find_by_login("alice").await.unwrap().unwrap();
    assert_eq!(w.tokens.active_count(user.id).await, 1);
}

#[tokio::test]
async fn logout_then_reject_token() {
    let w = world();
    let pair = register_alice(&w).await;

    w.service.logout(Some(&pair.access_token)).await.unwrap();

    let err = authenticate(
        w.accounts.as_ref(),
        w.tokens.as_ref(),
        &w.codec,
        &bearer(&pair.access_token),
        "/api/tasks",
    )
    .await
    .unwrap_err();
    assert_eq!(err, AuthError::unauthorized("Invalid or expired token"));
}

#[tokio::test]
async fn admin_reset_then_forced_change_flow() {
    let w = world();
    register_alice(&w).await;
    let target = w.accounts.find_by_login("alice@x.com").await.unwrap().unwrap();

    let admin = User::new("root", "root@x.com", "h", vec![Role::Admin]);
    w.accounts.save(&admin).await.unwrap();

    // 관리자 재설정: 임시 비밀번호 + 게이트 + 전체 세션 폐기
    let temp = w
        .service
        .reset_password(target.id, &admin_ctx(&admin))
        .await
        .unwrap();
    assert_eq!(temp, TEMP_PASSWORD);
    assert_eq!(w.tokens.active_count(target.id).await, 0);

    // 게이트가 설정된 동안 일반 로그인/갱신은 모두 차단
    let err = w.service.login("alice@x.com", TEMP_PASSWORD).await.unwrap_err();
    assert_eq!(err, AuthError::PasswordChangeRequired);

    // 강제 변경으로만 게이트 해제 가능, 즉시 로그인 상태가 된다
    let pair = w
        .service
        .forced_password_change("alice@x.com", TEMP_PASSWORD, "BrandNew123")
        .await
        .unwrap();

    let decision = authenticate(
        w.accounts.as_ref(),
        w.tokens.as_ref(),
        &w.codec,
        &bearer(&pair.access_token),
        "/api/tasks",
    )
    .await
    .unwrap();
    assert!(matches!(
        decision,
        sprint_api::auth::middleware::AuthDecision::Authenticated(_)
    ));

    // 이후 일반 로그인도 가능
    w.service.login("alice@x.com", "BrandNew123").await.unwrap();
}
