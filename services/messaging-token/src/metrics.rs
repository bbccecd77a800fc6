//! Prometheus metrics for token issuance and validation.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, CounterVec};

/// Tokens minted, by whether they target the shared bus audience.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "messaging_token_issued_total",
        "Total number of messaging tokens issued",
        &["audience_kind"]
    )
    .expect("Failed to register messaging_token_issued metric")
});

/// Issuance attempts rejected before signing.
pub static ISSUE_FAILURES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "messaging_token_issue_failures_total",
        "Total number of messaging token issuance failures",
        &["reason"]
    )
    .expect("Failed to register messaging_token_issue_failures metric")
});

/// Validation outcomes.
pub static VALIDATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "messaging_token_validations_total",
        "Total number of messaging token validations",
        &["status", "reason"]
    )
    .expect("Failed to register messaging_token_validations metric")
});

/// Record a minted token.
pub fn record_token_issued(audience_kind: &str) {
    TOKENS_ISSUED.with_label_values(&[audience_kind]).inc();
}

/// Record a rejected issuance.
pub fn record_issue_failure(reason: &str) {
    ISSUE_FAILURES.with_label_values(&[reason]).inc();
}

/// Record a successful validation.
pub fn record_validation_success() {
    VALIDATIONS.with_label_values(&["success", "none"]).inc();
}

/// Record a rejected token.
pub fn record_validation_failure(reason: &str) {
    VALIDATIONS.with_label_values(&["failure", reason]).inc();
}
