//! Connection and factory capability traits

use std::sync::Arc;

use async_trait::async_trait;

use crate::{EndpointConfig, Result};

/// A pooled connection handle.
///
/// The pool only depends on this narrow surface; whatever query or
/// command interface a driver exposes on top of it is opaque to the
/// pool. Handles are not assumed internally synchronized - the leasing
/// protocol guarantees at most one caller uses a handle at a time.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "mysql", "postgresql")
    fn driver_name(&self) -> &str;

    /// Cheap liveness check. A handle reporting `false` is discarded
    /// by the pool instead of being handed out or kept idle.
    fn is_usable(&self) -> bool;

    /// Close the underlying connection. Idempotent.
    async fn close(&self) -> Result<()>;
}

/// Factory trait for establishing new connections.
///
/// Invoked during pool initialization and by the producer task when
/// the pool grows under demand. A failed attempt is reported as an
/// error and the handle is never counted against the pool.
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    /// Establish one connection against the given endpoint.
    async fn connect(&self, endpoint: &EndpointConfig) -> Result<Arc<dyn Connection>>;
}

#[async_trait]
impl<T: ConnectionFactory> ConnectionFactory for Arc<T> {
    async fn connect(&self, endpoint: &EndpointConfig) -> Result<Arc<dyn Connection>> {
        (**self).connect(endpoint).await
    }
}
