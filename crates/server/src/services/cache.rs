//! Redis cache client.
//!
//! The client is optional: without `REDIS_URL` the server runs with no
//! cache, and consumers must treat an absent client as the normal case.

use std::future::Future;

use redis::aio::MultiplexedConnection;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors that can occur while talking to Redis.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("unexpected PING reply: {0}")]
    UnexpectedReply(String),
}

/// Handle to the Redis cache.
///
/// Not `Clone`: the application state owns the only handle and lends it
/// out, so [`CacheClient::close`] ends the connection for everyone.
pub struct CacheClient {
    conn: MultiplexedConnection,
}

impl std::fmt::Debug for CacheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheClient").finish_non_exhaustive()
    }
}

impl CacheClient {
    /// Open a connection and verify it with `PING`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the URL is invalid or Redis is unreachable.
    pub async fn connect(url: &SecretString) -> Result<Self, CacheError> {
        let client = redis::Client::open(url.expose_secret())?;
        let conn = client.get_multiplexed_async_connection().await?;
        let cache = Self { conn };
        cache.ping().await?;
        Ok(cache)
    }

    /// Round-trip a `PING`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the command fails or the reply is not `PONG`.
    pub async fn ping(&self) -> Result<(), CacheError> {
        // Request-scoped handle on the shared pipeline, dropped on return.
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(CacheError::UnexpectedReply(reply))
        }
    }

    /// Close the connection.
    ///
    /// Consumes the only handle, which stops the connection driver and
    /// closes the socket.
    pub fn close(self) {
        drop(self.conn);
        tracing::debug!("Redis connection dropped");
    }
}

/// Opens the cache client during startup.
///
/// `Ok(None)` means no cache is configured, which is not an error.
pub trait CacheConnector: Send + Sync {
    fn connect(&self) -> impl Future<Output = Result<Option<CacheClient>, CacheError>> + Send;
}

/// Connects to the Redis instance named by `REDIS_URL`.
#[derive(Debug, Clone)]
pub struct RedisConnector {
    url: Option<SecretString>,
}

impl RedisConnector {
    #[must_use]
    pub const fn new(url: Option<SecretString>) -> Self {
        Self { url }
    }
}

impl CacheConnector for RedisConnector {
    async fn connect(&self) -> Result<Option<CacheClient>, CacheError> {
        match &self.url {
            Some(url) => CacheClient::connect(url).await.map(Some),
            None => Ok(None),
        }
    }
}
