//! Pool statistics types

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of pool occupancy
///
/// Counts are captured while the registry lock is held, so
/// `total == idle + leased` holds for every snapshot; `waiting` is
/// sampled alongside and can lag by one acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Total number of connections owned by the pool (idle + leased)
    total: usize,
    /// Number of idle connections available in the registry
    idle: usize,
    /// Number of connections currently leased out
    leased: usize,
    /// Number of callers waiting in `acquire`
    waiting: usize,
}

impl PoolStats {
    /// Create new pool statistics
    pub fn new(total: usize, idle: usize, leased: usize, waiting: usize) -> Self {
        Self {
            total,
            idle,
            leased,
            waiting,
        }
    }

    /// Get the total number of connections
    pub fn total(&self) -> usize {
        self.total
    }

    /// Get the number of idle connections
    pub fn idle(&self) -> usize {
        self.idle
    }

    /// Get the number of leased connections
    pub fn leased(&self) -> usize {
        self.leased
    }

    /// Get the number of waiting callers
    pub fn waiting(&self) -> usize {
        self.waiting
    }

    /// Fraction of owned connections currently leased out (0.0 to 1.0)
    ///
    /// An empty pool reports 0.0.
    pub fn utilization(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.leased as f64 / self.total as f64
        }
    }

    /// Check if every owned connection is currently leased out
    pub fn is_full(&self) -> bool {
        self.idle == 0 && self.total > 0
    }
}

impl Default for PoolStats {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}
