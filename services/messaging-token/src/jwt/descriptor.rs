use crate::error::DescriptorError;
use crate::jwt::claims::is_reserved;
use std::collections::BTreeMap;
use std::time::Duration;

/// Description of a token to be minted.
///
/// A plain value: build one per token and hand it to a
/// [`TokenFactory`](crate::jwt::TokenFactory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    /// Value of the `iss` claim
    pub issuer: String,
    /// Value of the `aud` claim
    pub audience: String,
    /// Custom string claims
    pub claims: BTreeMap<String, String>,
    /// Time between issuance and expiry
    pub lifetime: Duration,
}

impl TokenDescriptor {
    /// Descriptor with no custom claims.
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            claims: BTreeMap::new(),
            lifetime,
        }
    }

    /// Adds a custom claim, replacing any earlier value for the same name.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    /// Checks the descriptor invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant: empty audience, zero lifetime,
    /// or a custom claim named like a registered claim.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.audience.is_empty() {
            return Err(DescriptorError::EmptyAudience);
        }
        if self.lifetime.is_zero() {
            return Err(DescriptorError::NonPositiveLifetime);
        }
        if let Some(name) = self.claims.keys().find(|name| is_reserved(name)) {
            return Err(DescriptorError::ReservedClaim(name.clone()));
        }
        Ok(())
    }
}
