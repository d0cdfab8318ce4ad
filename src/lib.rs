//! Lumo Nonce Library
//!
//! Stateless, time-windowed nonces that bind a user, an application context
//! and an optional session token, verified without any server-side storage.

pub mod auth;
pub mod config;
pub mod error;
