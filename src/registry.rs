//! Source registry: one pooled connection per logical key.
//!
//! The registry maps logical source keys to [`SqlSource`] descriptors and
//! guarantees create-once registration: the first attach for a key wins, and
//! every later attach for that key is a no-op returning the existing
//! descriptor. Pools are created lazily, so attaching never opens a database
//! connection by itself; the first borrow does.

use crate::config::{SourceConfig, TunnelConfig};
use crate::error::DbResult;
use crate::tunnel::{TunnelHandle, TunnelProvider};
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// The registered record binding a source key to its connection parameters
/// and pool. Immutable once registered; lives as long as the process unless
/// the surrounding application closes the registry.
pub struct SqlSource {
    /// Logical name this source is registered under.
    pub key: String,
    /// Address of the database host. For tunneled sources this is the remote
    /// address; the pool itself connects through the local forwarding port.
    pub host: String,
    /// Port of the database host.
    pub port: u16,
    /// Name of the database.
    pub db_name: String,
    pool: MySqlPool,
    tunnel: Option<Box<dyn TunnelHandle>>,
}

impl SqlSource {
    fn direct(config: &SourceConfig) -> Self {
        let pool = Self::build_pool(&config.host, config.port, config);
        Self {
            key: config.key.clone(),
            host: config.host.clone(),
            port: config.port,
            db_name: config.db_name.clone(),
            pool,
            tunnel: None,
        }
    }

    fn tunneled(config: &SourceConfig, tunnel: Box<dyn TunnelHandle>) -> Self {
        // The tunnel forwards a local port to the remote host, so the pool
        // connects to localhost instead of the remote address.
        let pool = Self::build_pool("127.0.0.1", tunnel.local_port(), config);
        Self {
            key: config.key.clone(),
            host: config.host.clone(),
            port: config.port,
            db_name: config.db_name.clone(),
            pool,
            tunnel: Some(tunnel),
        }
    }

    /// Build a lazy pool. No connection is opened until first borrow, and
    /// connections are pinged before being handed out unless configured
    /// otherwise.
    fn build_pool(host: &str, port: u16, config: &SourceConfig) -> MySqlPool {
        let options = MySqlConnectOptions::new()
            .host(host)
            .port(port)
            .database(&config.db_name)
            .username(&config.username)
            .password(&config.password)
            .charset("utf8mb4");

        MySqlPoolOptions::new()
            .min_connections(config.pool.min_connections_or_default())
            .max_connections(config.pool.max_connections_or_default())
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_or_default()))
            .idle_timeout(Some(Duration::from_secs(
                config.pool.idle_timeout_or_default(),
            )))
            .test_before_acquire(config.pool.test_before_acquire_or_default())
            .connect_lazy_with(options)
    }

    /// The connection pool for this source.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Whether this source reaches its host through a forwarding tunnel.
    pub fn is_tunneled(&self) -> bool {
        self.tunnel.is_some()
    }

    /// Close the pool. The tunnel, if any, closes when the source is dropped.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl std::fmt::Debug for SqlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlSource")
            .field("key", &self.key)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_name", &self.db_name)
            .field("tunneled", &self.tunnel.is_some())
            .finish_non_exhaustive()
    }
}

/// Concurrent map of source key to descriptor.
///
/// An explicit instance with no ambient global state: create one at process
/// start and hand references to every consumer. All methods are safe to call
/// from any number of tasks; operations on distinct keys never contend beyond
/// the brief map lock.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: RwLock<HashMap<String, Arc<SqlSource>>>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(HashMap::new()),
        }
    }

    /// Register a source for `config.key` if none exists, otherwise return
    /// the existing descriptor unchanged - first registration wins, and a
    /// duplicate attach is never an error. Always returns the currently
    /// active descriptor for the key.
    pub async fn attach_if_absent(&self, config: SourceConfig) -> DbResult<Arc<SqlSource>> {
        config.validate()?;
        if let Some(existing) = self.get_source(&config.key).await {
            debug!(key = %config.key, "Source already attached");
            return Ok(existing);
        }
        let source = Arc::new(SqlSource::direct(&config));
        Ok(self.register(source).await)
    }

    /// Like [`attach_if_absent`](Self::attach_if_absent), but first opens a
    /// forwarding tunnel to `config.host:config.port` through `provider`.
    /// The pool then connects to `127.0.0.1:<local_port>`.
    ///
    /// Fails with [`DbError::Tunnel`](crate::error::DbError::Tunnel) if the
    /// tunnel cannot be established; nothing is registered for the key in
    /// that case, and no retry is attempted here.
    pub async fn attach_if_absent_tunneled(
        &self,
        config: SourceConfig,
        tunnel: TunnelConfig,
        provider: &dyn TunnelProvider,
    ) -> DbResult<Arc<SqlSource>> {
        config.validate()?;
        tunnel.validate()?;
        if let Some(existing) = self.get_source(&config.key).await {
            debug!(key = %config.key, "Source already attached");
            return Ok(existing);
        }

        info!(
            key = %config.key,
            host = %config.host,
            port = %config.port,
            local_port = %tunnel.local_port,
            "Opening tunnel"
        );
        let handle = provider.open(&config.host, config.port, &tunnel)?;
        let source = Arc::new(SqlSource::tunneled(&config, handle));
        Ok(self.register(source).await)
    }

    /// Retrieve the source registered under `key`. Lookup only, no side
    /// effects.
    pub async fn get_source(&self, key: &str) -> Option<Arc<SqlSource>> {
        let sources = self.sources.read().await;
        sources.get(key).cloned()
    }

    /// Check whether a source is registered under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        let sources = self.sources.read().await;
        sources.contains_key(key)
    }

    /// Number of registered sources.
    pub async fn source_count(&self) -> usize {
        let sources = self.sources.read().await;
        sources.len()
    }

    /// All registered source keys.
    pub async fn keys(&self) -> Vec<String> {
        let sources = self.sources.read().await;
        sources.keys().cloned().collect()
    }

    /// Close all pools and clear the registry.
    pub async fn close_all(&self) {
        // Drain under lock, close outside the lock.
        let drained: Vec<(String, Arc<SqlSource>)> = {
            let mut sources = self.sources.write().await;
            sources.drain().collect()
        };
        for (key, source) in drained {
            info!(key = %key, "Closing source");
            source.close().await;
        }
    }

    /// Insert under the write lock, re-checking for a racing registration.
    /// Construction may happen on both sides of a race, but only one result
    /// is retained and observable afterward.
    async fn register(&self, source: Arc<SqlSource>) -> Arc<SqlSource> {
        let mut sources = self.sources.write().await;
        match sources.entry(source.key.clone()) {
            Entry::Occupied(entry) => {
                // Lost the race. The discarded pool is lazy and has no live
                // connections to close.
                debug!(key = %entry.key(), "Source attached concurrently, keeping first");
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                info!(
                    key = %source.key,
                    host = %source.host,
                    port = %source.port,
                    db_name = %source.db_name,
                    tunneled = %source.is_tunneled(),
                    "Attached source"
                );
                Arc::clone(entry.insert(source))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;

    fn config(key: &str, host: &str) -> SourceConfig {
        SourceConfig::new(key, host, 3306, "app", "svc", "secret").unwrap()
    }

    struct FakeTunnel {
        port: u16,
    }

    impl TunnelHandle for FakeTunnel {
        fn local_port(&self) -> u16 {
            self.port
        }
    }

    struct FakeProvider;

    impl TunnelProvider for FakeProvider {
        fn open(
            &self,
            _remote_host: &str,
            _remote_port: u16,
            config: &TunnelConfig,
        ) -> DbResult<Box<dyn TunnelHandle>> {
            Ok(Box::new(FakeTunnel {
                port: config.local_port,
            }))
        }
    }

    struct FailingProvider;

    impl TunnelProvider for FailingProvider {
        fn open(
            &self,
            _remote_host: &str,
            _remote_port: u16,
            _config: &TunnelConfig,
        ) -> DbResult<Box<dyn TunnelHandle>> {
            Err(DbError::tunnel("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_attach_twice_returns_same_descriptor() {
        let registry = SourceRegistry::new();
        let first = registry.attach_if_absent(config("shard1", "db-a")).await.unwrap();
        // Second attach with different arguments is ignored.
        let second = registry.attach_if_absent(config("shard1", "db-b")).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.host, "db-a");
        assert_eq!(registry.source_count().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_are_independent() {
        let registry = SourceRegistry::new();
        let a = registry.attach_if_absent(config("shard1", "db-a")).await.unwrap();
        let b = registry.attach_if_absent(config("shard2", "db-b")).await.unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.source_count().await, 2);
        assert!(registry.contains("shard1").await);
        assert!(registry.contains("shard2").await);
    }

    #[tokio::test]
    async fn test_get_source_absent() {
        let registry = SourceRegistry::new();
        assert!(registry.get_source("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_attach_rejects_invalid_config() {
        let registry = SourceRegistry::new();
        let mut bad = config("shard1", "db-a");
        bad.key = String::new();

        let result = registry.attach_if_absent(bad).await;
        assert!(matches!(result, Err(DbError::Configuration { .. })));
        assert_eq!(registry.source_count().await, 0);
    }

    #[tokio::test]
    async fn test_tunneled_attach() {
        let registry = SourceRegistry::new();
        let tunnel = TunnelConfig::new("/etc/keys/bastion.pem", "deploy", 13306).unwrap();

        let source = registry
            .attach_if_absent_tunneled(config("remote", "db.remote"), tunnel, &FakeProvider)
            .await
            .unwrap();

        assert!(source.is_tunneled());
        // The descriptor keeps the remote address; only the pool goes local.
        assert_eq!(source.host, "db.remote");
        assert_eq!(source.port, 3306);
    }

    #[tokio::test]
    async fn test_tunnel_failure_registers_nothing() {
        let registry = SourceRegistry::new();
        let tunnel = TunnelConfig::new("/etc/keys/bastion.pem", "deploy", 13306).unwrap();

        let result = registry
            .attach_if_absent_tunneled(config("remote", "db.remote"), tunnel, &FailingProvider)
            .await;

        assert!(matches!(result, Err(DbError::Tunnel { .. })));
        assert!(!registry.contains("remote").await);
        assert_eq!(registry.source_count().await, 0);
    }

    #[tokio::test]
    async fn test_tunneled_attach_is_noop_for_existing_key() {
        let registry = SourceRegistry::new();
        let direct = registry.attach_if_absent(config("shard1", "db-a")).await.unwrap();

        let tunnel = TunnelConfig::new("/etc/keys/bastion.pem", "deploy", 13306).unwrap();
        // The failing provider is never consulted because the key exists.
        let existing = registry
            .attach_if_absent_tunneled(config("shard1", "db-b"), tunnel, &FailingProvider)
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&direct, &existing));
    }

    #[tokio::test]
    async fn test_close_all_clears_registry() {
        let registry = SourceRegistry::new();
        registry.attach_if_absent(config("shard1", "db-a")).await.unwrap();
        registry.attach_if_absent(config("shard2", "db-b")).await.unwrap();

        registry.close_all().await;
        assert_eq!(registry.source_count().await, 0);
    }
}
