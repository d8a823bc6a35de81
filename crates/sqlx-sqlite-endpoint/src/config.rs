//! Configuration for SQLite endpoint connection pools

use std::time::Duration;

/// Configuration for a [`SqliteEndpoint`](crate::SqliteEndpoint) pool
///
/// # Examples
///
/// ```
/// use sqlx_sqlite_endpoint::SqliteEndpointConfig;
/// use std::time::Duration;
///
/// // Use defaults
/// let config = SqliteEndpointConfig::default();
///
/// // Replica endpoints are usually read-only
/// let config = SqliteEndpointConfig {
///     read_only: true,
///     ..Default::default()
/// };
///
/// // Customize specific fields
/// let config = SqliteEndpointConfig {
///     max_connections: 3,
///     idle_timeout: Duration::from_secs(60),
///     read_only: false,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct SqliteEndpointConfig {
   /// Maximum number of concurrent connections in the pool
   ///
   /// Default: 6
   pub max_connections: u32,

   /// Idle timeout for pooled connections
   ///
   /// Connections that remain idle for this duration will be closed automatically.
   ///
   /// Default: 30 seconds
   pub idle_timeout: Duration,

   /// Open connections read-only. Writes fail at the SQLite level.
   ///
   /// A read-only endpoint never creates the database file.
   ///
   /// Default: false
   pub read_only: bool,
}

impl Default for SqliteEndpointConfig {
   fn default() -> Self {
      Self {
         max_connections: 6,
         idle_timeout: Duration::from_secs(30),
         read_only: false,
      }
   }
}

impl SqliteEndpointConfig {
   /// Defaults with `read_only` set, for replica endpoints.
   pub fn replica() -> Self {
      Self {
         read_only: true,
         ..Default::default()
      }
   }
}
