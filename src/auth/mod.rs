//! Nonce module.
//!
//! Handles time windows, HMAC token derivation, timing-safe comparison,
//! and two-window verification.

mod clock;
mod compare;
mod hmac;
mod nonce;

pub use clock::{Clock, FixedClock, SystemClock, TimeWindowClock};
pub use compare::constant_time_eq;
pub use hmac::{HashAlgorithm, Token, TokenDeriver, TOKEN_LEN};
pub use nonce::{NonceConfig, NonceVerifier, VerificationOutcome, DEFAULT_LIFETIME_SECONDS};
