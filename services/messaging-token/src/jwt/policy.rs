//! Validation policy.

use crate::error::ConfigError;
use crate::jwt::key::SigningKey;
use std::collections::BTreeSet;
use std::time::Duration;

/// Issuer check applied during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuerCheck {
    /// Any issuer is accepted
    Disabled,
    /// The token issuer must be one of these
    Trusted(BTreeSet<String>),
}

impl IssuerCheck {
    /// True if `issuer` passes this check.
    #[must_use]
    pub fn accepts(&self, issuer: &str) -> bool {
        match self {
            Self::Disabled => true,
            Self::Trusted(issuers) => issuers.contains(issuer),
        }
    }
}

/// Rules a token must satisfy to be accepted.
///
/// Immutable once built; share it by reference or clone.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    expected_audience: String,
    issuer_check: IssuerCheck,
    validate_lifetime: bool,
    clock_skew: Duration,
    signing_key: SigningKey,
}

impl ValidationPolicy {
    /// Start building a policy for tokens addressed to `expected_audience`.
    pub fn builder(signing_key: SigningKey, expected_audience: impl Into<String>) -> ValidationPolicyBuilder {
        ValidationPolicyBuilder {
            expected_audience: expected_audience.into(),
            expected_issuers: BTreeSet::new(),
            validate_issuer: None,
            validate_lifetime: true,
            clock_skew: Duration::ZERO,
            signing_key,
        }
    }

    /// Audience every token must carry.
    #[must_use]
    pub fn expected_audience(&self) -> &str {
        &self.expected_audience
    }

    /// Issuer rule.
    #[must_use]
    pub const fn issuer_check(&self) -> &IssuerCheck {
        &self.issuer_check
    }

    /// Whether `exp` and `nbf` are enforced.
    #[must_use]
    pub const fn validate_lifetime(&self) -> bool {
        self.validate_lifetime
    }

    /// Tolerance applied to `exp` and `nbf`.
    #[must_use]
    pub const fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    /// Verification key.
    #[must_use]
    pub const fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

/// Builder for [`ValidationPolicy`].
#[derive(Debug)]
pub struct ValidationPolicyBuilder {
    expected_audience: String,
    expected_issuers: BTreeSet<String>,
    validate_issuer: Option<bool>,
    validate_lifetime: bool,
    clock_skew: Duration,
    signing_key: SigningKey,
}

impl ValidationPolicyBuilder {
    /// Trust one more issuer. Enables issuer validation unless it was
    /// explicitly turned off.
    #[must_use]
    pub fn expected_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuers.insert(issuer.into());
        self
    }

    /// Trust several issuers.
    #[must_use]
    pub fn expected_issuers<I, S>(mut self, issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_issuers.extend(issuers.into_iter().map(Into::into));
        self
    }

    /// Turn issuer validation on or off explicitly.
    #[must_use]
    pub const fn validate_issuer(mut self, enabled: bool) -> Self {
        self.validate_issuer = Some(enabled);
        self
    }

    /// Turn `exp`/`nbf` enforcement on or off. On by default.
    #[must_use]
    pub const fn validate_lifetime(mut self, enabled: bool) -> Self {
        self.validate_lifetime = enabled;
        self
    }

    /// Clock skew tolerance. Zero by default.
    #[must_use]
    pub const fn clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Finish the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAudience`] for an empty audience and
    /// [`ConfigError::IssuerValidationWithoutIssuer`] when issuer
    /// validation is enabled without any expected issuer.
    pub fn build(self) -> Result<ValidationPolicy, ConfigError> {
        if self.expected_audience.is_empty() {
            return Err(ConfigError::EmptyAudience);
        }

        let validate_issuer = self
            .validate_issuer
            .unwrap_or(!self.expected_issuers.is_empty());
        let issuer_check = match (validate_issuer, self.expected_issuers.is_empty()) {
            (false, _) => IssuerCheck::Disabled,
            (true, true) => return Err(ConfigError::IssuerValidationWithoutIssuer),
            (true, false) => IssuerCheck::Trusted(self.expected_issuers),
        };

        Ok(ValidationPolicy {
            expected_audience: self.expected_audience,
            issuer_check,
            validate_lifetime: self.validate_lifetime,
            clock_skew: self.clock_skew,
            signing_key: self.signing_key,
        })
    }
}
