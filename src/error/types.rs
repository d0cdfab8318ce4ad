//! Error types for nonce creation and verification.

use thiserror::Error;

/// Main error type for the crate.
///
/// A token that simply does not match is not an error; see
/// [`VerificationOutcome::Invalid`](crate::auth::VerificationOutcome::Invalid).
#[derive(Error, Debug)]
pub enum NonceError {
    /// Configuration-related errors (non-positive lifetime, bad settings file).
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A hash identifier that is not one of the supported algorithms.
    #[error("Unsupported hash algorithm: {name}")]
    UnsupportedAlgorithm { name: String },

    /// The MAC primitive rejected its key.
    ///
    /// HMAC accepts keys of any length, so this is a defensive branch kept
    /// because the primitive's keyed constructor is fallible.
    #[error("Crypto error: {message}")]
    Crypto { message: String },

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
