//! Time windows for nonce lifetimes.
//!
//! Wall-clock time is quantized into ticks of half a lifetime each, so two
//! consecutive ticks cover exactly one full lifetime.

use std::num::NonZeroU64;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::NonceError;

/// Source of the current Unix time in seconds.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_seconds(&self) -> u64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_seconds(&self) -> u64 {
        self.0
    }
}

/// Maps wall-clock seconds onto half-lifetime ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindowClock {
    lifetime: NonZeroU64,
}

impl TimeWindowClock {
    /// Create a clock for the given lifetime.
    ///
    /// Fails with [`NonceError::Config`] if `lifetime_seconds` is zero.
    pub fn new(lifetime_seconds: u64) -> Result<Self, NonceError> {
        let lifetime = NonZeroU64::new(lifetime_seconds).ok_or_else(|| NonceError::Config {
            message: "Nonce lifetime must be a positive number of seconds".to_string(),
        })?;
        Ok(Self::from_lifetime(lifetime))
    }

    pub const fn from_lifetime(lifetime: NonZeroU64) -> Self {
        Self { lifetime }
    }

    /// Compute `ceil(now / (lifetime / 2))` without constructing a clock.
    pub fn current_tick(now_seconds: u64, lifetime_seconds: u64) -> Result<u64, NonceError> {
        Ok(Self::new(lifetime_seconds)?.tick_at(now_seconds))
    }

    /// The configured lifetime in seconds.
    pub fn lifetime_seconds(&self) -> u64 {
        self.lifetime.get()
    }

    /// Tick containing `now_seconds`.
    ///
    /// `ceil(now / (L / 2))` equals `ceil(2 * now / L)`, which stays exact for
    /// odd lifetimes. The intermediate is widened so `2 * now` cannot overflow.
    pub fn tick_at(&self, now_seconds: u64) -> u64 {
        let doubled = u128::from(now_seconds) * 2;
        let lifetime = u128::from(self.lifetime.get());
        let tick = doubled.div_ceil(lifetime);
        // Only a one-second lifetime can exceed u64::MAX here.
        u64::try_from(tick).unwrap_or(u64::MAX)
    }
}
