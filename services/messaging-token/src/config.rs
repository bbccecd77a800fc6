//! Configuration for messaging tokens.
//!
//! Loaded from environment variables at startup and validated before any
//! factory or validator is built. A missing secret is reported here, never
//! as a token error later on.

use crate::error::ConfigError;
use crate::jwt::{SigningKey, ValidationPolicy};
use crate::messaging::{DEFAULT_CLOCK_SKEW, MESSAGING_AUDIENCE, MessagingTokenFactory, MessagingTokenValidator};
use crate::observability::{LogConfig, LogFormat};
use std::env;
use std::time::Duration;

/// Base64-encoded shared secret.
pub const SECRET_VAR: &str = "MESSAGING_TOKEN_SECRET";
/// Logical name of the current service.
pub const SERVICE_NAME_VAR: &str = "SERVICE_NAME";
/// Comma-separated list of services whose tokens are accepted.
pub const TRUSTED_ISSUERS_VAR: &str = "MESSAGING_TRUSTED_ISSUERS";
/// Whether the issuer claim is checked.
pub const VALIDATE_ISSUER_VAR: &str = "MESSAGING_VALIDATE_ISSUER";
/// Clock skew tolerance in seconds.
pub const CLOCK_SKEW_VAR: &str = "MESSAGING_CLOCK_SKEW_SECS";
/// Log level filter.
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
/// Log output format.
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// Messaging token configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name used as issuer for outgoing tokens
    pub service_name: String,
    /// Shared HMAC secret
    pub signing_key: SigningKey,
    /// Services whose tokens are accepted
    pub trusted_issuers: Vec<String>,
    /// Whether to check the issuer claim
    pub validate_issuer: bool,
    /// Clock skew tolerance
    pub clock_skew: Duration,
    /// Logging settings
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from the process environment, after reading a
    /// `.env` file if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(SECRET_VAR).ok_or(ConfigError::MissingVariable(SECRET_VAR))?;
        let signing_key = SigningKey::from_base64(&secret)?;

        let service_name = lookup(SERVICE_NAME_VAR)
            .map(|name| name.trim().to_string())
            .ok_or(ConfigError::MissingVariable(SERVICE_NAME_VAR))?;
        if service_name.is_empty() {
            return Err(ConfigError::EmptyServiceName);
        }

        let trusted_issuers: Vec<String> = lookup(TRUSTED_ISSUERS_VAR)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|issuer| !issuer.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let validate_issuer = parse_var(&lookup, VALIDATE_ISSUER_VAR, true)?;
        let clock_skew =
            Duration::from_secs(parse_var(&lookup, CLOCK_SKEW_VAR, DEFAULT_CLOCK_SKEW.as_secs())?);

        let mut log = LogConfig::default();
        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            log = log.with_level(level);
        }
        if let Some(format) = lookup(LOG_FORMAT_VAR) {
            log = log.with_format(parse_log_format(&format)?);
        }

        Ok(Self {
            service_name,
            signing_key,
            trusted_issuers,
            validate_issuer,
            clock_skew,
            log,
        })
    }

    /// Build the issuance adapter for this service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyServiceName`] if the service name is empty.
    pub fn issuance(&self) -> Result<MessagingTokenFactory, ConfigError> {
        MessagingTokenFactory::new(self.signing_key.clone(), self.service_name.clone())
    }

    /// Build the validation adapter for this service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IssuerValidationWithoutIssuer`] when issuer
    /// validation is on and no trusted issuers are configured.
    pub fn validation(&self) -> Result<MessagingTokenValidator, ConfigError> {
        let policy = ValidationPolicy::builder(self.signing_key.clone(), MESSAGING_AUDIENCE)
            .expected_issuers(self.trusted_issuers.iter().cloned())
            .validate_issuer(self.validate_issuer)
            .clock_skew(self.clock_skew)
            .build()?;
        MessagingTokenValidator::new(policy)
    }
}

/// Parse an optional variable, falling back to `default` when absent.
fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "json" => Ok(LogFormat::Json),
        "pretty" | "text" => Ok(LogFormat::Pretty),
        other => Err(ConfigError::InvalidValue {
            name: LOG_FORMAT_VAR,
            reason: format!("unknown log format '{other}'"),
        }),
    }
}
