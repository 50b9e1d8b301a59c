//! 토큰 서명 키 자재.
//!
//! 설정된 비밀 키 문자열에서 HMAC-SHA256 서명 키를 파생합니다.
//! 비밀 키는 HEX, Base64, 원시 UTF-8 세 가지 인코딩을 허용하며
//! 이 순서대로 분류를 시도합니다. 많은 HEX 문자열이 Base64 알파벳으로도
//! 유효하므로 운영자 기대와 일치하도록 HEX를 먼저 검사합니다.
//!
//! 디코딩 결과가 256비트(32바이트) 미만이면 시작 시점에 치명적 오류로
//! 처리되어 서비스가 기동되지 않습니다. 키는 프로세스 전역 읽기 전용이며
//! 런타임 로테이션은 지원하지 않습니다.

use base64::Engine;
use jsonwebtoken::{DecodingKey, EncodingKey};
use thiserror::Error;
use tracing::{debug, warn};

/// 비밀 키로 판별된 인코딩.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretEncoding {
    /// 16진수 문자열 (선택적 `0x` 접두사)
    Hex,
    /// 표준 Base64
    Base64,
    /// 원시 UTF-8 바이트
    Raw,
}

impl std::fmt::Display for SecretEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SecretEncoding::Hex => "HEX",
            SecretEncoding::Base64 => "Base64",
            SecretEncoding::Raw => "UTF-8",
        };
        write!(f, "{}", s)
    }
}

/// 키 자재 파생 에러.
///
/// 모든 변형은 시작 시점의 치명적 오류입니다.
#[derive(Debug, Error)]
pub enum KeyError {
    /// 비밀 키 미설정
    #[error("JWT secret key is missing (auth.secret_key)")]
    Missing,

    /// 디코딩 결과가 256비트 미만
    #[error(
        "JWT {encoding} secret must be at least 256 bits (32 bytes). Current: {bytes} bytes ({} bits)",
        .bytes * 8
    )]
    TooShort {
        /// 판별된 인코딩
        encoding: SecretEncoding,
        /// 디코딩된 바이트 수
        bytes: usize,
    },
}

/// HMAC-SHA256 서명 키 쌍.
///
/// 프로세스 시작 시 한 번 생성되어 전역으로 공유됩니다.
#[derive(Clone)]
pub struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    detected: SecretEncoding,
    key_len: usize,
}

impl SigningKeys {
    /// 설정된 비밀 키 문자열에서 서명 키를 파생합니다.
    ///
    /// 분류 순서: HEX → Base64 → 원시 UTF-8. Base64 디코딩이 실패하면
    /// 원시 UTF-8 바이트로 폴백합니다.
    ///
    /// # Errors
    ///
    /// - [`KeyError::Missing`]: 비어 있는 비밀 키
    /// - [`KeyError::TooShort`]: 디코딩 결과가 32바이트 미만
    pub fn from_secret(secret: &str) -> Result<Self, KeyError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(KeyError::Missing);
        }

        let (bytes, detected) = decode_secret(secret);
        if bytes.len() < 32 {
            return Err(KeyError::TooShort {
                encoding: detected,
                bytes: bytes.len(),
            });
        }
        if bytes.len() == 32 {
            warn!(
                "JWT secret is exactly 256 bits. Consider using a longer key \
                 (384 or 512 bits) for better security."
            );
        }
        debug!(
            encoding = %detected,
            bytes = bytes.len(),
            bits = bytes.len() * 8,
            "Signing key material derived"
        );

        Ok(Self {
            encoding: EncodingKey::from_secret(&bytes),
            decoding: DecodingKey::from_secret(&bytes),
            detected,
            key_len: bytes.len(),
        })
    }

    /// 서명용 키 반환.
    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    /// 검증용 키 반환.
    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }

    /// 판별된 비밀 키 인코딩 반환.
    pub fn detected_encoding(&self) -> SecretEncoding {
        self.detected
    }

    /// 파생된 키 바이트 수 반환.
    pub fn key_len(&self) -> usize {
        self.key_len
    }
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 키 바이트는 절대 출력하지 않는다
        f.debug_struct("SigningKeys")
            .field("detected", &self.detected)
            .field("key_len", &self.key_len)
            .finish()
    }
}

/// 분류 순서에 따라 비밀 키를 디코딩합니다.
fn decode_secret(secret: &str) -> (Vec<u8>, SecretEncoding) {
    if is_hex(secret) {
        let cleaned = strip_hex_prefix(secret);
        // is_hex 검사를 통과했으므로 디코딩은 실패하지 않는다
        if let Ok(bytes) = hex::decode(cleaned) {
            return (bytes, SecretEncoding::Hex);
        }
    }
    if is_base64(secret) {
        match base64::engine::general_purpose::STANDARD.decode(secret) {
            Ok(bytes) => return (bytes, SecretEncoding::Base64),
            Err(e) => {
                warn!("Base64 decoding failed, falling back to raw bytes: {}", e);
            }
        }
    }
    (secret.as_bytes().to_vec(), SecretEncoding::Raw)
}

/// 선택적 `0x`/`0X` 접두사 제거.
fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// HEX 분류: 전체 길이가 짝수이고, 접두사 제거 후 전부 16진수 문자.
fn is_hex(s: &str) -> bool {
    if s.len() % 2 != 0 {
        return false;
    }
    let cleaned = strip_hex_prefix(s);
    !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_hexdigit())
}

/// Base64 분류: 길이가 4의 배수이고, 패딩(최대 2개, 끝에만)을 제외한
/// 모든 문자가 표준 Base64 알파벳.
fn is_base64(s: &str) -> bool {
    if s.is_empty() || s.len() % 4 != 0 {
        return false;
    }
    let trimmed = s.trim_end_matches('=');
    if s.len() - trimmed.len() > 2 {
        return false;
    }
    trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use proptest::prelude::*;

    #[test]
    fn test_hex_secret_of_32_bytes_accepted() {
        // 64개의 16진수 문자 = 32바이트, 최소 허용 크기
        let secret = "00".repeat(32);
        let keys = SigningKeys::from_secret(&secret).unwrap();
        assert_eq!(keys.detected_encoding(), SecretEncoding::Hex);
        assert_eq!(keys.key_len(), 32);
    }

    #[test]
    fn test_hex_secret_of_31_bytes_rejected() {
        let secret = "00".repeat(31);
        let err = SigningKeys::from_secret(&secret).unwrap_err();
        assert!(matches!(
            err,
            KeyError::TooShort {
                encoding: SecretEncoding::Hex,
                bytes: 31
            }
        ));
    }

    #[test]
    fn test_hex_prefix_is_stripped() {
        let secret = format!("0x{}", "ab".repeat(33));
        let keys = SigningKeys::from_secret(&secret).unwrap();
        assert_eq!(keys.detected_encoding(), SecretEncoding::Hex);
        assert_eq!(keys.key_len(), 33);
    }

    #[test]
    fn test_hex_takes_precedence_over_base64() {
        // 64개의 'a'는 유효한 HEX(32바이트)이면서 Base64 알파벳(48바이트)이기도 함.
        // HEX가 먼저 판별되어야 한다.
        let secret = "a".repeat(64);
        let keys = SigningKeys::from_secret(&secret).unwrap();
        assert_eq!(keys.detected_encoding(), SecretEncoding::Hex);
        assert_eq!(keys.key_len(), 32);
    }

    #[test]
    fn test_base64_secret_accepted() {
        let raw = [7u8; 48];
        let secret = base64::engine::general_purpose::STANDARD.encode(raw);
        let keys = SigningKeys::from_secret(&secret).unwrap();
        assert_eq!(keys.detected_encoding(), SecretEncoding::Base64);
        assert_eq!(keys.key_len(), 48);
    }

    #[test]
    fn test_base64_secret_too_short_rejected() {
        let raw = [7u8; 16];
        let secret = base64::engine::general_purpose::STANDARD.encode(raw);
        let err = SigningKeys::from_secret(&secret).unwrap_err();
        assert!(matches!(
            err,
            KeyError::TooShort {
                encoding: SecretEncoding::Base64,
                ..
            }
        ));
    }

    #[test]
    fn test_raw_secret_accepted() {
        let secret = "this-is-a-sufficiently-long-raw-secret-!";
        let keys = SigningKeys::from_secret(secret).unwrap();
        assert_eq!(keys.detected_encoding(), SecretEncoding::Raw);
        assert_eq!(keys.key_len(), secret.len());
    }

    #[test]
    fn test_raw_secret_too_short_rejected() {
        let err = SigningKeys::from_secret("short-secret!").unwrap_err();
        assert!(matches!(
            err,
            KeyError::TooShort {
                encoding: SecretEncoding::Raw,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(SigningKeys::from_secret(""), Err(KeyError::Missing)));
        assert!(matches!(
            SigningKeys::from_secret("   "),
            Err(KeyError::Missing)
        ));
    }

    #[test]
    fn test_secret_is_trimmed() {
        let secret = format!("  {}  ", "cd".repeat(32));
        let keys = SigningKeys::from_secret(&secret).unwrap();
        assert_eq!(keys.detected_encoding(), SecretEncoding::Hex);
    }

    #[test]
    fn test_odd_length_hex_falls_through() {
        // 홀수 길이는 HEX가 아니며, 길이 41은 4의 배수도 아니므로 원시 바이트
        let secret = "abcdefabcdefabcdefabcdefabcdefabcdefabcde";
        assert_eq!(secret.len(), 41);
        let keys = SigningKeys::from_secret(secret).unwrap();
        assert_eq!(keys.detected_encoding(), SecretEncoding::Raw);
    }

    #[test]
    fn test_base64_classification_rules() {
        assert!(is_base64("QUJDRA=="));
        assert!(is_base64("QUJDRAQUJDRA"));
        // 길이가 4의 배수가 아님
        assert!(!is_base64("QUJDR"));
        // 패딩 3개는 허용하지 않음
        assert!(!is_base64("Q==="));
        // 알파벳 밖의 문자
        assert!(!is_base64("QUJD-A=="));
        assert!(!is_base64(""));
    }

    proptest! {
        #[test]
        fn prop_64_char_hex_secrets_accepted(secret in "[0-9a-fA-F]{64}") {
            let keys = SigningKeys::from_secret(&secret).unwrap();
            prop_assert_eq!(keys.detected_encoding(), SecretEncoding::Hex);
            prop_assert_eq!(keys.key_len(), 32);
        }

        #[test]
        fn prop_short_hex_secrets_rejected(secret in "(?:[0-9a-f]{2}){1,31}") {
            prop_assert!(
                matches!(
                    SigningKeys::from_secret(&secret),
                    Err(KeyError::TooShort { .. })
                ),
                "short hex secret should be rejected as TooShort"
            );
        }

        #[test]
        fn prop_long_raw_secrets_accepted(tail in "[!-~]{31,63}") {
            // '!'는 HEX도 Base64 알파벳도 아니므로 항상 원시 바이트로 분류
            let secret = format!("!{}", tail);
            let keys = SigningKeys::from_secret(&secret).unwrap();
            prop_assert_eq!(keys.detected_encoding(), SecretEncoding::Raw);
        }
    }
}
