//! Validated endpoint configuration
//!
//! The pool receives connection parameters as an already-validated
//! structure. Parsing a configuration file or environment into this
//! structure is the loader's job, not the pool's.

use serde::{Deserialize, Serialize};

/// Endpoint and credential parameters for establishing connections.
///
/// Passed by reference to the `ConnectionFactory` every time a
/// connection is established. The `Debug` impl masks the password so
/// the structure is safe to log.
#[derive(Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Remote host name or address
    pub host: String,

    /// Remote port
    pub port: u16,

    /// Database name to select after connecting
    pub database: String,

    /// User name presented to the endpoint
    pub username: String,

    /// Password presented to the endpoint
    pub password: String,
}

impl EndpointConfig {
    /// Create a configuration for the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            database: String::new(),
            username: String::new(),
            password: String::new(),
        }
    }

    /// Set the database name
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the user name and password
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// `host:port` form, for log fields
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<masked>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = EndpointConfig::new("db.internal", 3306)
            .with_database("orders")
            .with_credentials("app", "s3cret");

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 3306);
        assert_eq!(config.database, "orders");
        assert_eq!(config.username, "app");
        assert_eq!(config.password, "s3cret");
        assert_eq!(config.address(), "db.internal:3306");
    }

    #[test]
    fn test_debug_masks_password() {
        let config = EndpointConfig::new("localhost", 5432).with_credentials("app", "s3cret");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("<masked>"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = EndpointConfig::new("localhost", 5432)
            .with_database("test")
            .with_credentials("user", "pass");

        let json = serde_json::to_string(&config).expect("serialize");
        let back: EndpointConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.host, "localhost");
        assert_eq!(back.password, "pass");
    }
}
