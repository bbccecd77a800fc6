use crate::error::{ConfigError, TokenError};
use crate::jwt::{JwtTokenFactory, SigningKey, TokenDescriptor, TokenFactory};
use crate::messaging::{MESSAGING_AUDIENCE, MESSAGING_TOKEN_LIFETIME};
use crate::metrics;

/// Issuance adapter for the sending service.
///
/// Holds the shared key and this service's name, and delegates signing to
/// the wrapped factory.
#[derive(Debug, Clone)]
pub struct MessagingTokenFactory<F = JwtTokenFactory> {
    inner: F,
    signing_key: SigningKey,
    service_name: String,
}

impl MessagingTokenFactory {
    /// Issuance adapter backed by the HS256 JWT factory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyServiceName`] if `service_name` is empty.
    pub fn new(signing_key: SigningKey, service_name: impl Into<String>) -> Result<Self, ConfigError> {
        Self::with_factory(JwtTokenFactory::new(), signing_key, service_name)
    }
}

impl<F: TokenFactory> MessagingTokenFactory<F> {
    /// Issuance adapter delegating to `inner`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyServiceName`] if `service_name` is empty.
    pub fn with_factory(
        inner: F,
        signing_key: SigningKey,
        service_name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let service_name = service_name.into();
        if service_name.is_empty() {
            return Err(ConfigError::EmptyServiceName);
        }
        Ok(Self {
            inner,
            signing_key,
            service_name,
        })
    }

    /// Name used as the `iss` claim.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Descriptor this adapter mints for `audience`.
    #[must_use]
    pub fn descriptor_for(&self, audience: impl Into<String>) -> TokenDescriptor {
        TokenDescriptor::new(self.service_name.clone(), audience, MESSAGING_TOKEN_LIFETIME)
    }

    /// Mint a token from this service to `destination_service`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidDescriptor`] if `destination_service`
    /// is empty.
    pub fn create_for(&self, destination_service: &str) -> Result<String, TokenError> {
        self.mint(destination_service, "direct")
    }

    /// Mint a token addressed to the shared bus audience, as accepted by
    /// [`MessagingTokenValidator`](crate::messaging::MessagingTokenValidator).
    ///
    /// # Errors
    ///
    /// Propagates signing failures from the wrapped factory.
    pub fn create_for_bus(&self) -> Result<String, TokenError> {
        self.mint(MESSAGING_AUDIENCE, "bus")
    }

    fn mint(&self, audience: &str, audience_kind: &str) -> Result<String, TokenError> {
        let token = self
            .inner
            .create(&self.descriptor_for(audience), &self.signing_key)?;
        metrics::record_token_issued(audience_kind);
        Ok(token)
    }
}

impl<F: TokenFactory> TokenFactory for MessagingTokenFactory<F> {
    fn create(&self, descriptor: &TokenDescriptor, key: &SigningKey) -> Result<String, TokenError> {
        let token = self.inner.create(descriptor, key)?;
        metrics::record_token_issued("descriptor");
        Ok(token)
    }
}
