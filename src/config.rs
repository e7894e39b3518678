//! Source and tunnel configuration.
//!
//! No file format is mandated; these structs are passed as explicit
//! arguments to [`SourceRegistry`](crate::registry::SourceRegistry).
//! Structural validation happens at construction so that bad inputs are
//! rejected before any pool or tunnel is created.

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};

/// Default maximum connections per pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default minimum connections held open per pool.
pub const DEFAULT_MIN_CONNECTIONS: u32 = 0;

/// Default connection acquire timeout in seconds.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Connection pool tuning options. All fields are optional; absent fields
/// fall back to the crate defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolOptions {
    /// Maximum connections in the pool (default: 10)
    pub max_connections: Option<u32>,
    /// Minimum connections in the pool (default: 0)
    pub min_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: Option<u64>,
    /// Idle timeout in seconds (default: 600)
    pub idle_timeout_secs: Option<u64>,
    /// Whether to ping connections before handing them out (default: true)
    pub test_before_acquire: Option<bool>,
}

impl PoolOptions {
    /// Get max_connections with default value.
    pub fn max_connections_or_default(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Get min_connections with default value.
    pub fn min_connections_or_default(&self) -> u32 {
        self.min_connections.unwrap_or(DEFAULT_MIN_CONNECTIONS)
    }

    /// Get acquire_timeout with default value.
    pub fn acquire_timeout_or_default(&self) -> u64 {
        self.acquire_timeout_secs
            .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS)
    }

    /// Get idle_timeout with default value.
    pub fn idle_timeout_or_default(&self) -> u64 {
        self.idle_timeout_secs.unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS)
    }

    /// Get test_before_acquire with default value.
    pub fn test_before_acquire_or_default(&self) -> bool {
        self.test_before_acquire.unwrap_or(true)
    }
}

/// Configuration for one logical source: the key it is registered under
/// plus everything needed to reach the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Logical name the source is registered under.
    pub key: String,
    /// Address of the database host.
    pub host: String,
    /// Port of the database host.
    pub port: u16,
    /// Name of the database.
    pub db_name: String,
    /// Login user name.
    pub username: String,
    /// Contains sensitive data - never log
    #[serde(skip_serializing)]
    pub password: String,
    /// Connection pool tuning.
    #[serde(default)]
    pub pool: PoolOptions,
}

impl SourceConfig {
    /// Create a validated source configuration.
    pub fn new(
        key: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        db_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> DbResult<Self> {
        let config = Self {
            key: key.into(),
            host: host.into(),
            port,
            db_name: db_name.into(),
            username: username.into(),
            password: password.into(),
            pool: PoolOptions::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the pool tuning options.
    pub fn with_pool(mut self, pool: PoolOptions) -> Self {
        self.pool = pool;
        self
    }

    /// Check structural validity. Also called by the registry, since the
    /// struct fields are public and literals bypass [`SourceConfig::new`].
    pub fn validate(&self) -> DbResult<()> {
        if self.key.is_empty() {
            return Err(DbError::configuration("source key cannot be empty"));
        }
        if self.host.is_empty() {
            return Err(DbError::configuration("host cannot be empty"));
        }
        if self.port == 0 {
            return Err(DbError::configuration("port cannot be zero"));
        }
        if self.db_name.is_empty() {
            return Err(DbError::configuration("database name cannot be empty"));
        }
        if self.username.is_empty() {
            return Err(DbError::configuration("username cannot be empty"));
        }
        Ok(())
    }
}

/// Configuration for the transport tunnel in front of a source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunnelConfig {
    /// Path to the key file used to authenticate the tunnel.
    pub key_path: String,
    /// Login identity on the tunnel host.
    pub username: String,
    /// Forwarding port to open on the local machine.
    pub local_port: u16,
}

impl TunnelConfig {
    /// Create a validated tunnel configuration.
    pub fn new(
        key_path: impl Into<String>,
        username: impl Into<String>,
        local_port: u16,
    ) -> DbResult<Self> {
        let config = Self {
            key_path: key_path.into(),
            username: username.into(),
            local_port,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check structural validity.
    pub fn validate(&self) -> DbResult<()> {
        if self.key_path.is_empty() {
            return Err(DbError::configuration("tunnel key path cannot be empty"));
        }
        if self.username.is_empty() {
            return Err(DbError::configuration("tunnel username cannot be empty"));
        }
        if self.local_port == 0 {
            return Err(DbError::configuration("tunnel local port cannot be zero"));
        }
        Ok(())
    }
}
