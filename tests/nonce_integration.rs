//! Integration tests for Lumo nonces.
//!
//! These tests drive the public API end to end: settings file on disk,
//! nonce creation, and verification across tick boundaries.

use std::io::Write;

use tempfile::NamedTempFile;

use lumo_nonce::auth::{
    constant_time_eq, FixedClock, HashAlgorithm, NonceConfig, NonceVerifier, TimeWindowClock,
    TokenDeriver, VerificationOutcome,
};
use lumo_nonce::config::Settings;
use lumo_nonce::error::NonceError;

const NOW: u64 = 1_000_000_000;

/// Write a settings file and load it.
fn load_settings(content: &str) -> Result<Settings, NonceError> {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write settings");
    Settings::load(file.path())
}

#[test]
fn test_legacy_settings_reproduce_reference_tokens() {
    let settings = load_settings(
        r#"
        [nonce]
        lifetime_seconds = 86400
        algorithm = "md5"
        "#,
    )
    .unwrap();
    let verifier = NonceVerifier::with_clock(settings.nonce_config().unwrap(), FixedClock(NOW));

    let token = verifier.create("u1", "ctx", "").unwrap();
    assert_eq!(token.as_str(), "0d8f56e64a");
    assert_eq!(
        verifier.verify("u1", "ctx", "0d8f56e64a", "").unwrap(),
        VerificationOutcome::ValidCurrentWindow
    );
}

#[test]
fn test_missing_settings_file() {
    let result = Settings::load("/nonexistent/lumo/nonce.toml");
    assert!(matches!(result, Err(NonceError::Config { .. })));
}

#[test]
fn test_malformed_settings_file() {
    let result = load_settings("[nonce\nlifetime_seconds = ");
    match result {
        Err(NonceError::Config { message }) => {
            assert!(message.starts_with("Failed to parse config file"))
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_unsupported_algorithm_in_settings() {
    let result = load_settings("[nonce]\nalgorithm = \"md4\"\n");
    assert!(matches!(
        result,
        Err(NonceError::UnsupportedAlgorithm { .. })
    ));
}

#[test]
fn test_lifecycle_across_ticks() {
    let lifetime = 600;
    let config = NonceConfig::new(lifetime, HashAlgorithm::Sha256).unwrap();
    let issuer = NonceVerifier::with_clock(config, FixedClock(NOW));
    let token = issuer.create("alice", "delete-post:42", "session").unwrap();

    let window = TimeWindowClock::new(lifetime).unwrap();
    let issued_tick = window.tick_at(NOW);

    // Walk forward a second at a time and record the outcome per tick.
    let mut now = NOW;
    loop {
        let outcome = issuer
            .verify_at(now, "alice", "delete-post:42", token.as_str(), "session")
            .unwrap();
        let tick = window.tick_at(now);
        match tick - issued_tick {
            0 => assert_eq!(outcome, VerificationOutcome::ValidCurrentWindow),
            1 => assert_eq!(outcome, VerificationOutcome::ValidPreviousWindow),
            _ => {
                assert_eq!(outcome, VerificationOutcome::Invalid);
                break;
            }
        }
        now += 1;
    }

    // Accepted for at most one full lifetime.
    assert!(now - NOW <= lifetime);
    assert!(now - NOW > lifetime / 2);
}

#[test]
fn test_renewal_on_previous_window() {
    let config = NonceConfig::default();
    let half = config.lifetime_seconds() / 2;
    let verifier = NonceVerifier::with_clock(config, FixedClock(NOW + half));

    let old = verifier.create_at(NOW, "u1", "ctx", "k").unwrap();
    let outcome = verifier.verify("u1", "ctx", old.as_str(), "k").unwrap();
    assert_eq!(outcome, VerificationOutcome::ValidPreviousWindow);

    let fresh = verifier.create("u1", "ctx", "k").unwrap();
    assert_ne!(fresh, old);
    assert_eq!(
        verifier.verify("u1", "ctx", fresh.as_str(), "k").unwrap(),
        VerificationOutcome::ValidCurrentWindow
    );
}

#[test]
fn test_algorithms_produce_distinct_formats() {
    let tick = TimeWindowClock::current_tick(NOW, 86_400).unwrap();
    let tokens: Vec<_> = HashAlgorithm::ALL
        .iter()
        .map(|&algorithm| {
            TokenDeriver::new(algorithm)
                .derive(tick, b"u1", b"ctx", b"")
                .unwrap()
        })
        .collect();

    for token in &tokens {
        assert_eq!(token.len(), 10);
        assert!(token.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
    }
    for i in 0..tokens.len() {
        for j in (i + 1)..tokens.len() {
            assert_ne!(tokens[i], tokens[j]);
        }
    }
}

#[test]
fn test_token_minted_under_other_algorithm_rejected() {
    let legacy = NonceVerifier::with_clock(NonceConfig::legacy(), FixedClock(NOW));
    let modern = NonceVerifier::with_clock(NonceConfig::default(), FixedClock(NOW));

    let token = legacy.create("u1", "ctx", "").unwrap();
    assert_eq!(
        modern.verify("u1", "ctx", token.as_str(), "").unwrap(),
        VerificationOutcome::Invalid
    );
}

#[test]
fn test_long_user_token_key() {
    // Keys longer than the hash block are hashed before use.
    let verifier = NonceVerifier::with_clock(NonceConfig::legacy(), FixedClock(NOW));
    let long_key = "k".repeat(200);
    let token = verifier.create("u1", "ctx", &long_key).unwrap();
    assert_eq!(token.len(), 10);
    assert_eq!(
        verifier.verify("u1", "ctx", token.as_str(), &long_key).unwrap(),
        VerificationOutcome::ValidCurrentWindow
    );
}

#[test]
fn test_constant_time_eq_examples() {
    assert!(!constant_time_eq(b"abc", b"abd"));
    assert!(constant_time_eq(b"abc", b"abc"));
    assert!(!constant_time_eq(b"ab", b"abc"));
}
