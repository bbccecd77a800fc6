//! Token minting.

use crate::error::{DescriptorError, TokenError};
use crate::jwt::claims::{Claims, TOKEN_ID_CLAIM};
use crate::jwt::descriptor::TokenDescriptor;
use crate::jwt::key::SigningKey;
use crate::metrics;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tracing::debug;

/// Mints signed compact tokens.
pub trait TokenFactory: Send + Sync {
    /// Mint a token described by `descriptor`, signed with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidDescriptor`] if the descriptor violates
    /// an invariant; nothing is signed in that case.
    fn create(&self, descriptor: &TokenDescriptor, key: &SigningKey) -> Result<String, TokenError>;
}

/// HS256 JWT factory.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtTokenFactory;

impl JwtTokenFactory {
    /// Create a factory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Build the claim set for `descriptor` as of `now_millis`.
    fn claims_at(descriptor: &TokenDescriptor, now_millis: i64) -> Result<Claims, DescriptorError> {
        let lifetime_millis = i64::try_from(descriptor.lifetime.as_millis())
            .map_err(|_| DescriptorError::LifetimeOutOfRange)?;
        let expires_millis = now_millis
            .checked_add(lifetime_millis)
            .ok_or(DescriptorError::LifetimeOutOfRange)?;

        // A caller-supplied jti is kept as the token id.
        let mut custom = descriptor.claims.clone();
        let jti = custom
            .remove(TOKEN_ID_CLAIM)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        // Whole seconds, rounded down, so exp never outlives the real deadline.
        let now = now_millis.div_euclid(1000);
        Ok(Claims {
            iss: descriptor.issuer.clone(),
            aud: descriptor.audience.clone(),
            iat: now,
            nbf: now,
            exp: expires_millis.div_euclid(1000),
            jti: Some(jti),
            custom,
        })
    }
}

impl TokenFactory for JwtTokenFactory {
    fn create(&self, descriptor: &TokenDescriptor, key: &SigningKey) -> Result<String, TokenError> {
        let claims = descriptor
            .validate()
            .and_then(|()| Self::claims_at(descriptor, chrono::Utc::now().timestamp_millis()))
            .inspect_err(|e| {
                metrics::record_issue_failure("TOKEN_DESCRIPTOR_INVALID");
                debug!(error = %e, audience = %descriptor.audience, "Rejected token descriptor");
            })?;

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.expose()),
        )?;

        debug!(
            issuer = %claims.iss,
            audience = %claims.aud,
            jti = claims.jti.as_deref().unwrap_or_default(),
            exp = claims.exp,
            "Issued token"
        );

        Ok(token)
    }
}
