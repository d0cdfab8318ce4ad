//! Stateless nonce creation and verification.
//!
//! A nonce is valid during the tick it was created in and the tick after,
//! so it lives between half a lifetime and a full lifetime. Nothing is
//! stored between calls.

use std::num::NonZeroU64;

use serde::Serialize;
use tracing::debug;

use crate::error::NonceError;

use super::clock::{Clock, SystemClock, TimeWindowClock};
use super::hmac::{HashAlgorithm, Token, TokenDeriver};

/// Default nonce lifetime: one day.
pub const DEFAULT_LIFETIME_SECONDS: u64 = 86_400;

/// Immutable nonce parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceConfig {
    window: TimeWindowClock,
    algorithm: HashAlgorithm,
}

impl NonceConfig {
    /// Build a configuration.
    ///
    /// Fails with [`NonceError::Config`] if `lifetime_seconds` is zero.
    pub fn new(lifetime_seconds: u64, algorithm: HashAlgorithm) -> Result<Self, NonceError> {
        Ok(Self {
            window: TimeWindowClock::new(lifetime_seconds)?,
            algorithm,
        })
    }

    /// One-day lifetime with HMAC-MD5, compatible with tokens issued by
    /// legacy deployments.
    pub fn legacy() -> Self {
        Self {
            window: default_window(),
            algorithm: HashAlgorithm::Md5,
        }
    }

    pub fn lifetime_seconds(&self) -> u64 {
        self.window.lifetime_seconds()
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            algorithm: HashAlgorithm::default(),
        }
    }
}

const DEFAULT_LIFETIME: NonZeroU64 = match NonZeroU64::new(DEFAULT_LIFETIME_SECONDS) {
    Some(lifetime) => lifetime,
    None => panic!("default lifetime must be non-zero"),
};

fn default_window() -> TimeWindowClock {
    TimeWindowClock::from_lifetime(DEFAULT_LIFETIME)
}

/// Result of checking a candidate nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Matches neither window.
    Invalid = 0,
    /// Created during the current tick.
    ValidCurrentWindow = 1,
    /// Created during the previous tick; callers may issue a fresh nonce.
    ValidPreviousWindow = 2,
}

impl VerificationOutcome {
    pub fn is_valid(&self) -> bool {
        !matches!(self, VerificationOutcome::Invalid)
    }

    /// Numeric code: 0 invalid, 1 current window, 2 previous window.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Creates and verifies nonces.
///
/// Holds no mutable state, so a single instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct NonceVerifier<C: Clock = SystemClock> {
    config: NonceConfig,
    deriver: TokenDeriver,
    clock: C,
}

impl NonceVerifier<SystemClock> {
    /// Create a verifier reading the system clock.
    pub fn new(config: NonceConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> NonceVerifier<C> {
    /// Create a verifier reading the given clock.
    pub fn with_clock(config: NonceConfig, clock: C) -> Self {
        Self {
            deriver: TokenDeriver::new(config.algorithm),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &NonceConfig {
        &self.config
    }

    /// Create a nonce for the current tick.
    ///
    /// `user_token` may be empty.
    pub fn create(
        &self,
        user_id: &str,
        context: &str,
        user_token: &str,
    ) -> Result<Token, NonceError> {
        self.create_at(self.clock.now_seconds(), user_id, context, user_token)
    }

    /// Create a nonce as of `now_seconds`.
    pub fn create_at(
        &self,
        now_seconds: u64,
        user_id: &str,
        context: &str,
        user_token: &str,
    ) -> Result<Token, NonceError> {
        let tick = self.config.window.tick_at(now_seconds);
        let token = self.derive(tick, user_id, context, user_token)?;

        debug!(tick, algorithm = %self.config.algorithm, "Nonce created");

        Ok(token)
    }

    /// Verify a nonce against the current and the previous tick.
    ///
    /// A mismatch is reported as [`VerificationOutcome::Invalid`], never as
    /// an error.
    pub fn verify(
        &self,
        user_id: &str,
        context: &str,
        candidate: &str,
        user_token: &str,
    ) -> Result<VerificationOutcome, NonceError> {
        self.verify_at(
            self.clock.now_seconds(),
            user_id,
            context,
            candidate,
            user_token,
        )
    }

    /// Verify a nonce as of `now_seconds`.
    pub fn verify_at(
        &self,
        now_seconds: u64,
        user_id: &str,
        context: &str,
        candidate: &str,
        user_token: &str,
    ) -> Result<VerificationOutcome, NonceError> {
        if candidate.is_empty() {
            debug!("Empty nonce rejected");
            return Ok(VerificationOutcome::Invalid);
        }
        let candidate = Token::parse(candidate);

        let tick = self.config.window.tick_at(now_seconds);
        let outcome = if self.derive(tick, user_id, context, user_token)? == candidate {
            VerificationOutcome::ValidCurrentWindow
        } else {
            // Tick 0 (now == 0) has no previous window; a negative tick
            // would be `-1|...` in the legacy message format and is not derived.
            match tick.checked_sub(1) {
                Some(previous)
                    if self.derive(previous, user_id, context, user_token)? == candidate =>
                {
                    VerificationOutcome::ValidPreviousWindow
                }
                _ => VerificationOutcome::Invalid,
            }
        };

        debug!(tick, algorithm = %self.config.algorithm, outcome = ?outcome, "Nonce verified");

        Ok(outcome)
    }

    fn derive(
        &self,
        tick: u64,
        user_id: &str,
        context: &str,
        user_token: &str,
    ) -> Result<Token, NonceError> {
        self.deriver.derive(
            tick,
            user_id.as_bytes(),
            context.as_bytes(),
            user_token.as_bytes(),
        )
    }
}
