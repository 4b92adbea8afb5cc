//! Pool configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a connection pool
///
/// Controls pool sizing, the acquire wait bound, and how long a
/// connection may sit idle before the reaper closes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Connections created eagerly at startup; also the floor the
    /// reaper never shrinks below
    initial_size: usize,
    /// Hard ceiling on total connections (idle + leased)
    max_size: usize,
    /// Default wait bound in milliseconds for `acquire`
    acquire_timeout_ms: u64,
    /// Idle duration in milliseconds past which a connection is
    /// eligible for eviction; also the reaper's wake interval
    max_idle_ms: u64,
    /// How long `shutdown` waits for outstanding leases before closing
    /// the pool forcibly
    shutdown_grace_ms: u64,
}

impl PoolConfig {
    /// Create a new pool configuration with the given floor and ceiling.
    ///
    /// # Panics
    ///
    /// Panics if `initial_size` is 0 or exceeds `max_size`.
    pub fn new(initial_size: usize, max_size: usize) -> Self {
        assert!(
            initial_size > 0,
            "initial_size must be greater than 0, got {}",
            initial_size
        );
        assert!(
            initial_size <= max_size,
            "initial_size ({}) cannot exceed max_size ({})",
            initial_size,
            max_size
        );

        Self {
            initial_size,
            max_size,
            acquire_timeout_ms: 30_000, // 30 seconds default
            max_idle_ms: 600_000,       // 10 minutes default
            shutdown_grace_ms: 5_000,
        }
    }

    /// Set the default acquire timeout in milliseconds
    pub fn with_acquire_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.acquire_timeout_ms = timeout_ms;
        self
    }

    /// Set the idle threshold in milliseconds
    pub fn with_max_idle_ms(mut self, idle_ms: u64) -> Self {
        self.max_idle_ms = idle_ms;
        self
    }

    /// Set the shutdown grace period in milliseconds
    pub fn with_shutdown_grace_ms(mut self, grace_ms: u64) -> Self {
        self.shutdown_grace_ms = grace_ms;
        self
    }

    /// Get the pool floor
    pub fn initial_size(&self) -> usize {
        self.initial_size
    }

    /// Get the pool ceiling
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Get the default acquire timeout as a Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// Get the idle threshold as a Duration
    pub fn max_idle(&self) -> Duration {
        Duration::from_millis(self.max_idle_ms)
    }

    /// Get the shutdown grace period as a Duration
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for PoolConfig {
    /// Create a default pool configuration
    ///
    /// Defaults:
    /// - initial_size: 2
    /// - max_size: 10
    /// - acquire_timeout: 30 seconds
    /// - max_idle: 10 minutes
    /// - shutdown_grace: 5 seconds
    fn default() -> Self {
        Self::new(2, 10)
    }
}
