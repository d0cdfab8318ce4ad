//! Configuration module for Lumo nonces.
//!
//! Handles loading and validating nonce settings from TOML files.

mod settings;

pub use settings::*;
