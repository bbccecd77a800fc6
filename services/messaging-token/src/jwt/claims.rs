use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Registered claim names that custom claims may not use.
pub const RESERVED_CLAIMS: &[&str] = &["iss", "aud", "iat", "nbf", "exp"];

/// Name of the token identifier claim.
pub const TOKEN_ID_CLAIM: &str = "jti";

/// Returns true if `name` is a registered claim.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_CLAIMS.contains(&name)
}

/// Claim set carried in a token payload.
///
/// Returned by validation only when every check passed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Issuing service
    pub iss: String,
    /// Intended recipient
    pub aud: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Not before (Unix seconds)
    pub nbf: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Unique token identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Caller-supplied string claims
    #[serde(flatten)]
    pub custom: BTreeMap<String, String>,
}

impl Claims {
    /// Issuer claim.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.iss
    }

    /// Audience claim.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.aud
    }

    /// Looks up a custom claim by name. `jti` resolves to the token id.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&str> {
        if name == TOKEN_ID_CLAIM {
            return self.token_id();
        }
        self.custom.get(name).map(String::as_str)
    }

    /// All custom claims.
    #[must_use]
    pub const fn custom_claims(&self) -> &BTreeMap<String, String> {
        &self.custom
    }

    /// Token identifier, if the issuer set one.
    #[must_use]
    pub fn token_id(&self) -> Option<&str> {
        self.jti.as_deref()
    }

    /// `iat` as a timestamp.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        to_datetime(self.iat)
    }

    /// `nbf` as a timestamp.
    #[must_use]
    pub fn not_before(&self) -> DateTime<Utc> {
        to_datetime(self.nbf)
    }

    /// `exp` as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        to_datetime(self.exp)
    }

    /// Span between `iat` and `exp`, zero if `exp` precedes `iat`.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        u64::try_from(self.exp.saturating_sub(self.iat)).map_or(Duration::ZERO, Duration::from_secs)
    }
}

pub(crate) fn to_datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
