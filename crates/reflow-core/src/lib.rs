//! Reflow Core - Shared abstractions for the reflow connection pool
//!
//! This crate provides the fundamental traits and types that the pool
//! crate builds on. It defines:
//!
//! - `Connection` - Capability trait for a pooled connection handle
//! - `ConnectionFactory` - Trait for establishing new connections
//! - `EndpointConfig` - Validated endpoint/credential parameters
//! - `PoolError` / `Result` - Common error taxonomy

mod config;
mod connection;
mod error;

pub use config::EndpointConfig;
pub use connection::{Connection, ConnectionFactory};
pub use error::{PoolError, Result};
