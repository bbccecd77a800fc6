use crate::error::{ConfigError, TokenError};
use crate::jwt::{Claims, IssuerCheck, JwtTokenValidator, SigningKey, TokenValidator, ValidationPolicy};
use crate::messaging::{DEFAULT_CLOCK_SKEW, MESSAGING_AUDIENCE};

/// Validation adapter for the receiving service.
///
/// The policy is bound at construction and used for every call.
#[derive(Debug, Clone)]
pub struct MessagingTokenValidator<V = JwtTokenValidator> {
    inner: V,
    policy: ValidationPolicy,
}

impl MessagingTokenValidator {
    /// Validation adapter backed by the HS256 JWT validator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PolicyConvention`] unless the policy expects
    /// the `internal-bus` audience with lifetime validation enabled.
    pub fn new(policy: ValidationPolicy) -> Result<Self, ConfigError> {
        Self::with_validator(JwtTokenValidator::new(), policy)
    }

    /// Adapter accepting tokens from any of `trusted_issuers`, with the
    /// conventional audience, lifetime check and clock skew.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IssuerValidationWithoutIssuer`] if
    /// `trusted_issuers` is empty.
    pub fn for_trusted_issuers<I, S>(signing_key: SigningKey, trusted_issuers: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let policy = ValidationPolicy::builder(signing_key, MESSAGING_AUDIENCE)
            .expected_issuers(trusted_issuers)
            .validate_issuer(true)
            .validate_lifetime(true)
            .clock_skew(DEFAULT_CLOCK_SKEW)
            .build()?;
        Self::new(policy)
    }
}

impl<V: TokenValidator> MessagingTokenValidator<V> {
    /// Validation adapter delegating to `inner`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PolicyConvention`] unless the policy expects
    /// the `internal-bus` audience with lifetime validation enabled.
    pub fn with_validator(inner: V, policy: ValidationPolicy) -> Result<Self, ConfigError> {
        if policy.expected_audience() != MESSAGING_AUDIENCE {
            return Err(ConfigError::PolicyConvention(format!(
                "expected audience must be '{MESSAGING_AUDIENCE}', got '{}'",
                policy.expected_audience()
            )));
        }
        if !policy.validate_lifetime() {
            return Err(ConfigError::PolicyConvention(
                "lifetime validation must be enabled".to_string(),
            ));
        }
        Ok(Self { inner, policy })
    }

    /// The bound policy.
    #[must_use]
    pub const fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Issuers this adapter trusts, if issuer validation is on.
    #[must_use]
    pub fn trusted_issuers(&self) -> Option<impl Iterator<Item = &str>> {
        match self.policy.issuer_check() {
            IssuerCheck::Disabled => None,
            IssuerCheck::Trusted(issuers) => Some(issuers.iter().map(String::as_str)),
        }
    }

    /// Validate a token received with a message.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] with the first failed check.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.inner.validate(token, &self.policy)
    }
}

impl<V: TokenValidator> TokenValidator for MessagingTokenValidator<V> {
    /// The per-call policy is ignored; the bound policy always applies.
    fn validate(&self, token: &str, _policy: &ValidationPolicy) -> Result<Claims, TokenError> {
        self.inner.validate(token, &self.policy)
    }
}
