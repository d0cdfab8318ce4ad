//! HMAC token derivation.
//!
//! A token is the HMAC of `tick|user_id|context|user_token`, keyed with the
//! user token, hex encoded and cut down to ten characters.

use std::fmt;
use std::str::FromStr;

use ::hmac::{Hmac, Mac};
use md5::Md5;
use ring::hmac as ring_hmac;

use crate::error::NonceError;

use super::compare::constant_time_eq;

/// Length of a token in characters.
pub const TOKEN_LEN: usize = 10;

/// Number of trailing hex characters dropped after the token window.
const TOKEN_TAIL: usize = 2;

/// Separator between message fields.
const FIELD_SEPARATOR: u8 = b'|';

/// Hash functions a [`TokenDeriver`] can be built on.
///
/// `Md5` reproduces tokens issued by legacy deployments. New deployments
/// should stay on the default; switching algorithm changes every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    #[default]
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// All supported algorithms.
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
    ];

    /// Canonical lowercase identifier.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Digest size in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Block size in bytes; longer HMAC keys are hashed first.
    pub fn block_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 | HashAlgorithm::Sha1 | HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }

    fn ring_algorithm(&self) -> Option<ring_hmac::Algorithm> {
        match self {
            HashAlgorithm::Md5 => None,
            HashAlgorithm::Sha1 => Some(ring_hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY),
            HashAlgorithm::Sha256 => Some(ring_hmac::HMAC_SHA256),
            HashAlgorithm::Sha512 => Some(ring_hmac::HMAC_SHA512),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = NonceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" | "sha-1" => Ok(HashAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(HashAlgorithm::Sha512),
            _ => Err(NonceError::UnsupportedAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

/// A ten-character nonce.
///
/// Equality runs in constant time with respect to the token contents.
#[derive(Clone)]
pub struct Token(String);

impl Token {
    /// Wrap a caller-supplied string verbatim.
    pub fn parse(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self.0.as_bytes(), other.0.as_bytes())
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(2).collect();
        write!(f, "Token({}..)", prefix)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self::parse(s)
    }
}

/// Derives tokens from a tick, an identity, a context and a user token.
///
/// Derivation is a pure function of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenDeriver {
    algorithm: HashAlgorithm,
}

impl TokenDeriver {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Raw HMAC of `message` under `key` (RFC 2104).
    ///
    /// Any key length is accepted, including the empty key.
    pub fn mac(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>, NonceError> {
        match self.algorithm.ring_algorithm() {
            Some(algorithm) => {
                let key = ring_hmac::Key::new(algorithm, key);
                Ok(ring_hmac::sign(&key, message).as_ref().to_vec())
            }
            None => {
                // Hmac<Md5> takes keys of any length; the error arm is defensive.
                let mut mac =
                    <Hmac<Md5> as Mac>::new_from_slice(key).map_err(|e| NonceError::Crypto {
                        message: format!("Failed to key HMAC-MD5: {}", e),
                    })?;
                mac.update(message);
                Ok(mac.finalize().into_bytes().to_vec())
            }
        }
    }

    /// Lowercase hex HMAC of `message` under `key`.
    pub fn hex_mac(&self, key: &[u8], message: &[u8]) -> Result<String, NonceError> {
        Ok(hex::encode(self.mac(key, message)?))
    }

    /// Build the signed message `tick|user_id|context|user_token`.
    pub fn message(tick: u64, user_id: &[u8], context: &[u8], user_token: &[u8]) -> Vec<u8> {
        let tick = tick.to_string();
        let mut message =
            Vec::with_capacity(tick.len() + user_id.len() + context.len() + user_token.len() + 3);
        message.extend_from_slice(tick.as_bytes());
        for field in [user_id, context, user_token] {
            message.push(FIELD_SEPARATOR);
            message.extend_from_slice(field);
        }
        message
    }

    /// Derive the token for `tick`.
    ///
    /// The token is the ten hex characters that end two characters before
    /// the end of the full hex digest.
    pub fn derive(
        &self,
        tick: u64,
        user_id: &[u8],
        context: &[u8],
        user_token: &[u8],
    ) -> Result<Token, NonceError> {
        let message = Self::message(tick, user_id, context, user_token);
        let digest = self.hex_mac(user_token, &message)?;

        let end = digest.len() - TOKEN_TAIL;
        let start = end - TOKEN_LEN;
        Ok(Token(digest[start..end].to_string()))
    }
}
