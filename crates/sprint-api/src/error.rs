//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//! 도메인 에러 분류([`AuthError`])는 다음 상태 코드로 변환됩니다:
//!
//! | 분류 | 상태 코드 |
//! |------|-----------|
//! | Unauthorized | 401 |
//! | Forbidden | 403 |
//! | BadRequest | 400 |
//! | Conflict | 409 |
//! | NotFound | 404 |
//! | PasswordChangeRequired | 428 |
//! | Store | 500 (메시지는 일반화) |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sprint_core::AuthError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "UNAUTHORIZED",
///   "message": "Invalid or expired token"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "UNAUTHORIZED", "CONFLICT")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 타임스탬프 없는 간단한 에러.
    pub fn simple(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: None,
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 상태 코드가 결합된 API 에러.
///
/// 핸들러에서 `?` 연산자로 [`AuthError`]를 바로 전파할 수 있습니다.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP 상태 코드
    pub status: StatusCode,
    /// 응답 본문
    pub body: ApiErrorResponse,
}

impl ApiError {
    /// 새 API 에러 생성.
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse::new(code, message),
        }
    }

    /// 요청 본문 검증 실패 에러.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::PasswordChangeRequired => StatusCode::PRECONDITION_REQUIRED,
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // 저장소 내부 메시지는 외부로 노출하지 않는다
        let message = match &err {
            AuthError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        Self::new(status, err.code(), message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (AuthError::forbidden("x"), StatusCode::FORBIDDEN),
            (AuthError::bad_request("x"), StatusCode::BAD_REQUEST),
            (AuthError::conflict("x"), StatusCode::CONFLICT),
            (AuthError::not_found("x"), StatusCode::NOT_FOUND),
            (
                AuthError::PasswordChangeRequired,
                StatusCode::PRECONDITION_REQUIRED,
            ),
            (AuthError::store("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let api_err = ApiError::from(err);
            assert_eq!(api_err.status, expected);
        }
    }

    #[test]
    fn test_store_error_message_is_generalized() {
        let api_err = ApiError::from(AuthError::store("connection refused to 10.0.0.3"));
        assert_eq!(api_err.body.message, "Internal server error");
        assert!(!api_err.body.message.contains("10.0.0.3"));
    }

    #[test]
    fn test_gate_error_keeps_sentinel_message() {
        let api_err = ApiError::from(AuthError::PasswordChangeRequired);
        assert_eq!(api_err.body.code, "PASSWORD_CHANGE_REQUIRED");
        assert_eq!(api_err.body.message, "PASSWORD_CHANGE_REQUIRED");
    }

    #[test]
    fn test_json_shape() {
        let body = ApiErrorResponse::simple("NOT_FOUND", "User not found");
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""code":"NOT_FOUND""#));
        assert!(json.contains(r#""message":"User not found""#));
        assert!(!json.contains("timestamp"));
    }
}
