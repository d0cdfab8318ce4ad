//! Error types for Lumo nonces.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
