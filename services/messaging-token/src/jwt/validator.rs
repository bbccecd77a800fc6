//! Token validation.
//!
//! Checks run in a fixed order and stop at the first failure:
//! structure, algorithm, signature, payload, lifetime, issuer, audience.
//! The header's `alg` is only ever compared against HS256, never used to
//! pick a verification path.

use crate::error::{TokenError, TokenInvalid};
use crate::jwt::claims::{to_datetime, Claims};
use crate::jwt::policy::ValidationPolicy;
use crate::metrics;
use base64::Engine;
use ring::hmac;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

/// The only algorithm accepted in token headers.
pub const EXPECTED_ALGORITHM: &str = "HS256";

/// Verifies compact tokens against a policy.
pub trait TokenValidator: Send + Sync {
    /// Validate `token` under `policy` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] with the first failed check.
    fn validate(&self, token: &str, policy: &ValidationPolicy) -> Result<Claims, TokenError>;
}

#[derive(Debug, Deserialize)]
struct JoseHeader {
    alg: String,
}

/// HS256 JWT validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtTokenValidator;

impl JwtTokenValidator {
    /// Create a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Run every check with `now_millis` as the current time.
    fn check(token: &str, policy: &ValidationPolicy, now_millis: i64) -> Result<Claims, TokenInvalid> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header_segment, payload_segment, signature_segment] = segments.as_slice() else {
            return Err(TokenInvalid::malformed(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };

        let header: JoseHeader = decode_segment(header_segment, "header")?;
        if header.alg != EXPECTED_ALGORITHM {
            return Err(TokenInvalid::UnsupportedAlgorithm(header.alg));
        }

        let signing_input_len = header_segment.len() + 1 + payload_segment.len();
        verify_signature(
            &token.as_bytes()[..signing_input_len],
            signature_segment,
            &policy.signing_key().hmac_key(),
        )?;

        let claims: Claims = decode_segment(payload_segment, "payload")?;

        if policy.validate_lifetime() {
            let skew_millis = i64::try_from(policy.clock_skew().as_millis()).unwrap_or(i64::MAX);
            if now_millis > claims.exp.saturating_mul(1000).saturating_add(skew_millis) {
                return Err(TokenInvalid::Expired {
                    expired_at: to_datetime(claims.exp),
                });
            }
            if now_millis < claims.nbf.saturating_mul(1000).saturating_sub(skew_millis) {
                return Err(TokenInvalid::NotYetValid {
                    valid_from: to_datetime(claims.nbf),
                });
            }
        }

        if !policy.issuer_check().accepts(&claims.iss) {
            return Err(TokenInvalid::IssuerMismatch {
                issuer: claims.iss,
            });
        }

        if claims.aud != policy.expected_audience() {
            return Err(TokenInvalid::AudienceMismatch {
                audience: claims.aud,
            });
        }

        Ok(claims)
    }
}

impl TokenValidator for JwtTokenValidator {
    fn validate(&self, token: &str, policy: &ValidationPolicy) -> Result<Claims, TokenError> {
        match Self::check(token, policy, chrono::Utc::now().timestamp_millis()) {
            Ok(claims) => {
                metrics::record_validation_success();
                debug!(
                    issuer = %claims.iss,
                    audience = %claims.aud,
                    jti = claims.jti.as_deref().unwrap_or_default(),
                    "Token validated"
                );
                Ok(claims)
            }
            Err(invalid) => {
                metrics::record_validation_failure(invalid.code());
                warn!(code = invalid.code(), reason = %invalid, "Token rejected");
                Err(invalid.into())
            }
        }
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str, part: &str) -> Result<T, TokenInvalid> {
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenInvalid::malformed(format!("{part} is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenInvalid::malformed(format!("{part} is not valid JSON claims: {e}")))
}

fn verify_signature(signing_input: &[u8], signature_segment: &str, key: &hmac::Key) -> Result<(), TokenInvalid> {
    let Ok(signature) = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(signature_segment) else {
        return Err(TokenInvalid::SignatureMismatch);
    };
    let expected = hmac::sign(key, signing_input);
    if bool::from(expected.as_ref().ct_eq(signature.as_slice())) {
        Ok(())
    } else {
        Err(TokenInvalid::SignatureMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::key::SigningKey;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use std::time::Duration;

    const SECRET: &[u8] = b"validator-test-secret-key-32bytes!";
    const NOW: i64 = 1_700_000_000;

    fn policy() -> ValidationPolicy {
        ValidationPolicy::builder(SigningKey::from_bytes(SECRET.to_vec()).unwrap(), "payments-service")
            .expected_issuer("orders-service")
            .build()
            .unwrap()
    }

    fn sign(payload: &serde_json::Value) -> String {
        encode(&Header::new(Algorithm::HS256), payload, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    fn payload(iat: i64, exp: i64) -> serde_json::Value {
        serde_json::json!({
            "iss": "orders-service",
            "aud": "payments-service",
            "iat": iat,
            "nbf": iat,
            "exp": exp,
        })
    }

    #[test]
    fn test_accepts_valid_token() {
        let token = sign(&payload(NOW, NOW + 180));
        let claims = JwtTokenValidator::check(&token, &policy(), NOW * 1000 + 500).unwrap();
        assert_eq!(claims.iss, "orders-service");
    }

    #[test]
    fn test_expired_boundary() {
        let token = sign(&payload(NOW, NOW + 180));
        assert!(JwtTokenValidator::check(&token, &policy(), (NOW + 180) * 1000).is_ok());
        assert!(matches!(
            JwtTokenValidator::check(&token, &policy(), (NOW + 180) * 1000 + 1),
            Err(TokenInvalid::Expired { .. })
        ));
    }

    #[test]
    fn test_clock_skew_tolerates_late_validation() {
        let skewed = ValidationPolicy::builder(SigningKey::from_bytes(SECRET.to_vec()).unwrap(), "payments-service")
            .clock_skew(Duration::from_secs(30))
            .build()
            .unwrap();
        let token = sign(&payload(NOW, NOW + 180));

        assert!(JwtTokenValidator::check(&token, &skewed, (NOW + 200) * 1000).is_ok());
        assert!(JwtTokenValidator::check(&token, &skewed, (NOW - 20) * 1000).is_ok());
        assert!(matches!(
            JwtTokenValidator::check(&token, &skewed, (NOW + 211) * 1000),
            Err(TokenInvalid::Expired { .. })
        ));
        assert!(matches!(
            JwtTokenValidator::check(&token, &skewed, (NOW - 31) * 1000),
            Err(TokenInvalid::NotYetValid { .. })
        ));
    }

    #[test]
    fn test_lifetime_validation_disabled() {
        let relaxed = ValidationPolicy::builder(SigningKey::from_bytes(SECRET.to_vec()).unwrap(), "payments-service")
            .validate_lifetime(false)
            .build()
            .unwrap();
        let token = sign(&payload(NOW, NOW + 1));
        assert!(JwtTokenValidator::check(&token, &relaxed, (NOW + 3600) * 1000).is_ok());
    }

    #[test]
    fn test_wrong_segment_count() {
        for token in ["", "a.b", "a.b.c.d"] {
            assert!(matches!(
                JwtTokenValidator::check(token, &policy(), NOW * 1000),
                Err(TokenInvalid::Malformed { .. })
            ));
        }
    }

    #[test]
    fn test_algorithm_checked_before_signature() {
        let token = encode(
            &Header::new(Algorithm::HS384),
            &payload(NOW, NOW + 180),
            &EncodingKey::from_secret(b"some-other-key"),
        )
        .unwrap();
        assert_eq!(
            JwtTokenValidator::check(&token, &policy(), NOW * 1000),
            Err(TokenInvalid::UnsupportedAlgorithm("HS384".to_string()))
        );
    }

    #[test]
    fn test_issuer_checked_before_audience() {
        let mut claims = payload(NOW, NOW + 180);
        claims["iss"] = "billing-service".into();
        claims["aud"] = "internal-bus".into();
        let token = sign(&claims);
        assert!(matches!(
            JwtTokenValidator::check(&token, &policy(), NOW * 1000),
            Err(TokenInvalid::IssuerMismatch { issuer }) if issuer == "billing-service"
        ));
    }

    #[test]
    fn test_missing_registered_claim_is_malformed() {
        let token = sign(&serde_json::json!({ "iss": "orders-service", "aud": "payments-service" }));
        assert!(matches!(
            JwtTokenValidator::check(&token, &policy(), NOW * 1000),
            Err(TokenInvalid::Malformed { .. })
        ));
    }

    #[test]
    fn test_undecodable_signature() {
        let token = sign(&payload(NOW, NOW + 180));
        let (signed, _) = token.rsplit_once('.').unwrap();
        let forged = format!("{signed}.!!!");
        assert_eq!(
            JwtTokenValidator::check(&forged, &policy(), NOW * 1000),
            Err(TokenInvalid::SignatureMismatch)
        );
    }
}
