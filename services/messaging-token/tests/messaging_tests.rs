//! Integration tests for the messaging issuance and validation adapters.

use messaging_token::messaging::{MESSAGING_AUDIENCE, MESSAGING_TOKEN_LIFETIME};
use messaging_token::{
    JwtTokenFactory, JwtTokenValidator, MessagingTokenFactory, MessagingTokenValidator, SigningKey, TokenDescriptor,
    TokenError, TokenFactory, TokenInvalid, TokenValidator, ValidationPolicy,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const SECRET: &[u8] = b"integration-test-shared-secret-32b!";

fn key() -> SigningKey {
    SigningKey::from_bytes(SECRET.to_vec()).unwrap()
}

fn payments_policy() -> ValidationPolicy {
    ValidationPolicy::builder(key(), "payments-service")
        .expected_issuer("orders-service")
        .build()
        .unwrap()
}

#[test]
fn test_concurrent_create_for_yields_distinct_valid_tokens() {
    let factory = Arc::new(MessagingTokenFactory::new(key(), "orders-service").unwrap());

    let tokens: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = (0..100)
            .map(|_| {
                let factory = Arc::clone(&factory);
                scope.spawn(move || factory.create_for("payments-service").unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let unique: HashSet<&String> = tokens.iter().collect();
    assert_eq!(unique.len(), 100);

    let policy = payments_policy();
    let validator = JwtTokenValidator::new();
    let mut ids = HashSet::new();
    for token in &tokens {
        let claims = validator.validate(token, &policy).unwrap();
        assert!(ids.insert(claims.token_id().unwrap().to_string()));
    }
}

#[test]
fn test_create_for_uses_fixed_lifetime_and_issuer() {
    let factory = MessagingTokenFactory::new(key(), "orders-service").unwrap();
    let claims = JwtTokenValidator::new()
        .validate(&factory.create_for("payments-service").unwrap(), &payments_policy())
        .unwrap();

    assert_eq!(claims.issuer(), "orders-service");
    assert_eq!(claims.lifetime(), MESSAGING_TOKEN_LIFETIME);
    assert!(claims.custom_claims().is_empty());
}

#[test]
fn test_audience_enforcement() {
    let factory = MessagingTokenFactory::new(key(), "orders-service").unwrap();
    let validator = MessagingTokenValidator::for_trusted_issuers(key(), ["orders-service"]).unwrap();

    let token = factory.create_for("payments-service").unwrap();
    let result = validator.validate(&token);

    assert!(matches!(
        result,
        Err(TokenError::Invalid(TokenInvalid::AudienceMismatch { ref audience })) if audience == "payments-service"
    ));
}

#[test]
fn test_bus_round_trip() {
    let factory = MessagingTokenFactory::new(key(), "orders-service").unwrap();
    let validator =
        MessagingTokenValidator::for_trusted_issuers(key(), ["orders-service", "billing-service"]).unwrap();

    let claims = validator.validate(&factory.create_for_bus().unwrap()).unwrap();
    assert_eq!(claims.audience(), MESSAGING_AUDIENCE);
    assert_eq!(claims.issuer(), "orders-service");
}

#[test]
fn test_untrusted_issuer_rejected() {
    let factory = MessagingTokenFactory::new(key(), "unknown-service").unwrap();
    let validator = MessagingTokenValidator::for_trusted_issuers(key(), ["orders-service"]).unwrap();

    let result = validator.validate(&factory.create_for_bus().unwrap());
    assert!(matches!(
        result,
        Err(TokenError::Invalid(TokenInvalid::IssuerMismatch { .. }))
    ));
}

#[test]
fn test_key_isolation_between_services() {
    let factory = MessagingTokenFactory::new(key(), "orders-service").unwrap();
    let other_key = SigningKey::from_bytes(b"a-completely-different-secret-key!".to_vec()).unwrap();
    let validator = MessagingTokenValidator::for_trusted_issuers(other_key, ["orders-service"]).unwrap();

    let result = validator.validate(&factory.create_for_bus().unwrap());
    assert!(matches!(
        result,
        Err(TokenError::Invalid(TokenInvalid::SignatureMismatch))
    ));
}

#[test]
fn test_short_lifetime_expires() {
    let descriptor = TokenDescriptor::new("orders-service", "payments-service", Duration::from_millis(1));
    let token = JwtTokenFactory::new().create(&descriptor, &key()).unwrap();

    thread::sleep(Duration::from_millis(50));

    let result = JwtTokenValidator::new().validate(&token, &payments_policy());
    assert!(matches!(
        result,
        Err(TokenError::Invalid(TokenInvalid::Expired { .. }))
    ));
}

#[test]
fn test_adapter_create_matches_generic_factory_contract() {
    let factory = MessagingTokenFactory::new(key(), "orders-service").unwrap();
    let descriptor = TokenDescriptor::new("orders-service", "payments-service", Duration::from_secs(60))
        .with_claim("sub", "u123");

    // The adapter signs with the key it is given, not the one it holds.
    let other_key = SigningKey::from_bytes(b"per-call-signing-key-for-create!!!".to_vec()).unwrap();
    let token = factory.create(&descriptor, &other_key).unwrap();

    let policy = ValidationPolicy::builder(other_key, "payments-service").build().unwrap();
    let claims = JwtTokenValidator::new().validate(&token, &policy).unwrap();
    assert_eq!(claims.claim("sub"), Some("u123"));
}

#[test]
fn test_adapters_usable_through_trait_objects() {
    let factory: Box<dyn TokenFactory> = Box::new(MessagingTokenFactory::new(key(), "orders-service").unwrap());
    let validator: Box<dyn TokenValidator> =
        Box::new(MessagingTokenValidator::for_trusted_issuers(key(), ["orders-service"]).unwrap());

    let descriptor = TokenDescriptor::new("orders-service", MESSAGING_AUDIENCE, Duration::from_secs(60));
    let token = factory.create(&descriptor, &key()).unwrap();
    let claims = validator.validate(&token, &payments_policy()).unwrap();
    assert_eq!(claims.audience(), MESSAGING_AUDIENCE);
}
