//! 계정 저장소 및 토큰 원장 추상화.
//!
//! 계정 저장소는 외부 협력자이며 인증 코어는 이 좁은 인터페이스를 통해서만
//! 접근합니다. 토큰 원장은 발급된 토큰의 관리 상태(폐기/만료)를 기록하는
//! 유일한 가변 공유 자원입니다.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;

use super::user::User;

/// 계정 저장소 추상화.
///
/// 조회/저장 호출은 저장소 구현이 제공하는 바운디드 타임아웃 안에서
/// 수행되어야 하며, 실패나 타임아웃은 호출 측에서 항상 거부(fail-closed)로
/// 처리됩니다.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// 로그인 식별자(이메일 우선, 그다음 사용자명)로 계정 조회.
    ///
    /// 비교는 대소문자를 무시합니다.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AuthError>;

    /// ID로 계정 조회.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

    /// 사용자명 존재 여부 (대소문자 무시).
    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError>;

    /// 이메일 존재 여부 (대소문자 무시).
    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError>;

    /// 자격증명 검증 (로그인 식별자 + 평문 비밀번호 대조).
    ///
    /// 계정이 없거나 비활성인 경우에도 `false`만 반환하여 계정 열거를
    /// 방지합니다.
    async fn verify_credentials(&self, login: &str, raw_password: &str)
        -> Result<bool, AuthError>;

    /// 계정 저장 (삽입 또는 갱신).
    async fn save(&self, user: &User) -> Result<(), AuthError>;

    /// 전체 계정 목록 조회 (관리용).
    async fn list(&self) -> Result<Vec<User>, AuthError>;
}

/// 토큰 원장 추상화.
///
/// 토큰은 암호학적으로 자가 검증되지만 서버 측 폐기(로그아웃, 강제
/// 재설정, 자격증명 탈취 대응)가 가능해야 하므로, 원장이 무상태 서명 위에
/// 관리 상태를 덧씌웁니다. 토큰 문자열은 원장에게 불투명한 조회 키입니다.
///
/// 레코드는 물리적으로 삭제되지 않고 감사 추적으로 누적됩니다.
/// `revoked`와 `expired` 두 플래그는 항상 같은 연산에서 함께 갱신되며
/// 부분 폐기 상태는 외부에서 관측되지 않습니다.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// 발급된 access token 기록.
    async fn record(&self, principal_id: Uuid, token: &str) -> Result<(), AuthError>;

    /// 토큰 활성 여부: revoked=false AND expired=false인 레코드가 존재하면 참.
    async fn is_active(&self, token: &str) -> Result<bool, AuthError>;

    /// 해당 계정의 활성 토큰 전부를 폐기 (단일 갱신 연산).
    ///
    /// # Returns
    ///
    /// 폐기된 레코드 수.
    async fn revoke_all(&self, principal_id: Uuid) -> Result<u64, AuthError>;

    /// 제시된 토큰 하나만 폐기. 없는 토큰이면 아무 동작도 하지 않습니다.
    async fn revoke_one(&self, token: &str) -> Result<(), AuthError>;
}
