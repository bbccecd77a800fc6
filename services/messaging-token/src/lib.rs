//! Messaging Token library.
//!
//! Issues and validates short-lived HS256 tokens that authenticate messages
//! exchanged between internal services. The generic JWT factory and
//! validator live in [`jwt`]; [`messaging`] pins them to the internal bus
//! convention.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod jwt;
pub mod messaging;
pub mod metrics;
pub mod observability;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, DescriptorError, TokenError, TokenInvalid};
pub use jwt::{
    Claims, JwtTokenFactory, JwtTokenValidator, SigningKey, TokenDescriptor, TokenFactory, TokenValidator,
    ValidationPolicy,
};
pub use messaging::{MessagingTokenFactory, MessagingTokenValidator};
