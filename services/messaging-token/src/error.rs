//! Error types for token issuance, validation and configuration.
//!
//! Failures fall into three families:
//! - [`DescriptorError`] when a token cannot be minted from a descriptor
//! - [`TokenInvalid`] when a presented token is rejected
//! - [`ConfigError`] when a factory, validator or policy cannot be built
//!
//! None of the messages carry key material or raw token text.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Top-level error for every fallible operation in this crate.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TokenError {
    /// The descriptor violates an invariant and no token was minted
    #[error("Invalid token descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),

    /// The presented token was rejected as a whole
    #[error("Token invalid: {0}")]
    Invalid(#[from] TokenInvalid),

    /// A component was configured incorrectly
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Claims could not be serialized while minting
    #[error("Token encoding error: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Returns the rejection kind if this is a validation failure.
    #[must_use]
    pub const fn as_invalid(&self) -> Option<&TokenInvalid> {
        match self {
            Self::Invalid(kind) => Some(kind),
            _ => None,
        }
    }

    /// Stable code for logs and metric labels.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidDescriptor(_) => "TOKEN_DESCRIPTOR_INVALID",
            Self::Invalid(kind) => kind.code(),
            Self::Configuration(_) => "TOKEN_CONFIGURATION_ERROR",
            Self::Encoding(_) => "TOKEN_ENCODING_ERROR",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// Creation-time descriptor violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// Audience must be non-empty
    #[error("audience must not be empty")]
    EmptyAudience,

    /// Lifetime must be strictly positive
    #[error("lifetime must be greater than zero")]
    NonPositiveLifetime,

    /// Lifetime pushes the expiry past the representable timestamp range
    #[error("lifetime is out of range")]
    LifetimeOutOfRange,

    /// A custom claim uses a registered claim name
    #[error("claim name '{0}' is reserved")]
    ReservedClaim(String),
}

/// Reasons a presented token is rejected.
///
/// Validation short-circuits, so exactly one kind is reported per attempt.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenInvalid {
    /// Token structure, header or payload could not be decoded
    #[error("token malformed: {reason}")]
    Malformed {
        /// What could not be decoded
        reason: String,
    },

    /// Header names an algorithm other than HS256
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// HMAC over header and payload does not match the signature
    #[error("signature mismatch")]
    SignatureMismatch,

    /// Expiry plus clock skew lies in the past
    #[error("token expired at {expired_at}")]
    Expired {
        /// The token's `exp` claim
        expired_at: DateTime<Utc>,
    },

    /// Not-before minus clock skew lies in the future
    #[error("token not valid until {valid_from}")]
    NotYetValid {
        /// The token's `nbf` claim
        valid_from: DateTime<Utc>,
    },

    /// Issuer is not among the expected issuers
    #[error("issuer '{issuer}' is not trusted")]
    IssuerMismatch {
        /// The token's `iss` claim
        issuer: String,
    },

    /// Audience differs from the expected audience
    #[error("audience '{audience}' does not match")]
    AudienceMismatch {
        /// The token's `aud` claim
        audience: String,
    },
}

impl TokenInvalid {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Stable code for logs and metric labels.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "TOKEN_MALFORMED",
            Self::UnsupportedAlgorithm(_) => "TOKEN_UNSUPPORTED_ALGORITHM",
            Self::SignatureMismatch => "TOKEN_SIGNATURE_MISMATCH",
            Self::Expired { .. } => "TOKEN_EXPIRED",
            Self::NotYetValid { .. } => "TOKEN_NOT_YET_VALID",
            Self::IssuerMismatch { .. } => "TOKEN_ISSUER_MISMATCH",
            Self::AudienceMismatch { .. } => "TOKEN_AUDIENCE_MISMATCH",
        }
    }
}

/// Construction-time configuration errors.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is absent
    #[error("missing required variable {0}")]
    MissingVariable(&'static str),

    /// A variable is present but cannot be parsed
    #[error("invalid value for {name}: {reason}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Parse failure
        reason: String,
    },

    /// The shared secret is not valid base64
    #[error("signing secret is not valid base64: {0}")]
    InvalidSecret(String),

    /// The shared secret decodes to zero bytes
    #[error("signing secret is empty")]
    EmptySecret,

    /// The current service has no name to use as issuer
    #[error("service name must not be empty")]
    EmptyServiceName,

    /// A validation policy has no audience to enforce
    #[error("expected audience must not be empty")]
    EmptyAudience,

    /// Issuer validation is enabled but nothing is trusted
    #[error("issuer validation is enabled but no expected issuer was supplied")]
    IssuerValidationWithoutIssuer,

    /// A policy does not follow the messaging convention
    #[error("policy violates messaging convention: {0}")]
    PolicyConvention(String),
}
