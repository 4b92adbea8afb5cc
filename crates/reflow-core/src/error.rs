//! Error types for reflow

use std::time::Duration;

use thiserror::Error;

/// Core error type for pool operations
#[derive(Error, Debug)]
pub enum PoolError {
    /// Initialization could not produce a single usable connection,
    /// or the supplied configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single connection could not be established. Transient: the
    /// producer task absorbs these and retries, callers never see them
    /// directly.
    #[error("Connection error: {0}")]
    Connect(String),

    /// No connection became available within the caller's wait bound.
    #[error("Timed out waiting for a connection after {0:?}")]
    AcquireTimeout(Duration),

    /// The pool has begun shutting down and accepts no new acquires.
    #[error("Pool is closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PoolError::AcquireTimeout(Duration::from_millis(50));
        assert!(err.to_string().contains("50ms"));

        let err = PoolError::Closed;
        assert_eq!(err.to_string(), "Pool is closed");

        let err = PoolError::Config("no usable connections".into());
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: PoolError = io.into();
        assert!(matches!(err, PoolError::Io(_)));
    }
}
