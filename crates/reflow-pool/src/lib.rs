//! Reflow Pool - bounded, concurrent pooling of long-lived connections
//!
//! A pool amortizes expensive connection setup by reusing previously
//! established connections, and bounds total resource usage against the
//! remote endpoint's capacity. Callers acquire a [`Lease`], use the
//! connection through it, and return it to the pool by dropping it.
//!
//! Connection establishment never happens on the acquire path: a
//! background producer task grows the pool whenever the idle supply is
//! exhausted, and a background reaper task closes connections that have
//! been idle past a configured threshold, never shrinking the pool
//! below its floor.
//!
//! # Example
//!
//! ```ignore
//! use reflow_pool::{ConnectionPool, EndpointConfig, PoolConfig};
//!
//! let endpoint = EndpointConfig::new("db.internal", 3306)
//!     .with_database("orders")
//!     .with_credentials("app", "secret");
//! let config = PoolConfig::new(2, 10).with_acquire_timeout_ms(5_000);
//!
//! let pool = ConnectionPool::initialize(config, endpoint, factory).await?;
//! let lease = pool.acquire().await?;
//! // Use the connection through the lease...
//! // Returned to the pool on drop
//! ```

mod backoff;
mod config;
mod lifecycle;
mod pool;
mod producer;
mod reaper;
mod stats;


pub use backoff::BackoffStrategy;
pub use config::PoolConfig;
pub use lifecycle::PoolState;
pub use pool::{ConnectionPool, Lease};
pub use stats::PoolStats;

pub use reflow_core::{Connection, ConnectionFactory, EndpointConfig, PoolError, Result};
