//! Internal message bus convention.
//!
//! Adapters that pin the generic JWT factory and validator to fixed
//! messaging parameters: the `internal-bus` audience, a three minute
//! lifetime and the sending service as issuer.

pub mod factory;
pub mod validator;

use std::time::Duration;

pub use factory::MessagingTokenFactory;
pub use validator::MessagingTokenValidator;

/// Audience shared by every service on the internal bus.
pub const MESSAGING_AUDIENCE: &str = "internal-bus";

/// Lifetime of every messaging token.
pub const MESSAGING_TOKEN_LIFETIME: Duration = Duration::from_secs(180);

/// Message header that conventionally carries the token.
pub const MESSAGING_TOKEN_HEADER: &str = "X-Messaging-Token";

/// Clock skew tolerated between services on the bus.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(30);
