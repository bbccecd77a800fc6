//! Symmetric signing key.

use crate::error::ConfigError;
use base64::Engine;
use ring::hmac;
use std::fmt;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Recommended minimum secret length for HS256 (256 bits).
pub const MIN_RECOMMENDED_KEY_LEN: usize = 32;

/// Shared HMAC secret held in memory.
///
/// The bytes are zeroized on drop and never appear in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey {
    bytes: Vec<u8>,
}

impl SigningKey {
    /// Wrap raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecret`] if `bytes` is empty.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if bytes.len() < MIN_RECOMMENDED_KEY_LEN {
            warn!(
                key_len = bytes.len(),
                recommended = MIN_RECOMMENDED_KEY_LEN,
                "Signing key is shorter than recommended"
            );
        }
        Ok(Self { bytes })
    }

    /// Decode a standard-alphabet base64 secret, as stored in configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSecret`] if the value is not base64
    /// and [`ConfigError::EmptySecret`] if it decodes to nothing.
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| ConfigError::InvalidSecret(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    /// Secret length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; empty keys are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn hmac_key(&self) -> hmac::Key {
        hmac::Key::new(hmac::HMAC_SHA256, &self.bytes)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey([REDACTED; {} bytes])", self.bytes.len())
    }
}
