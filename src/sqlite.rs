//! Replica clients over SQLite endpoints

use replica_router::{Endpoint, Router};
use sqlx_sqlite_endpoint::{SqliteEndpoint, SqliteEndpointConfig};

use crate::{ReplicaClient, ReplicaClientBuilder, ReplicaConfig, Result};

/// Replica client whose operations fail with the SQLite endpoint error
pub type SqliteReplicaClient = ReplicaClient<sqlx_sqlite_endpoint::Error>;

/// Open a primary and its replicas and return a builder with the router installed.
///
/// The replica configuration is validated before any endpoint is opened.
/// Replicas are opened read-only. Hooks added to the returned builder run
/// after the router, for operations that go to the primary.
pub fn open(
   primary_url: &str,
   replicas: &ReplicaConfig,
   custom_config: Option<SqliteEndpointConfig>,
) -> Result<ReplicaClientBuilder<sqlx_sqlite_endpoint::Error>> {
   let descriptors = replicas.descriptors()?;
   let classifier = replicas.classifier();
   let config = custom_config.unwrap_or_default();

   let pool = replicas.build_pool(|descriptor| {
      let endpoint = SqliteEndpoint::open(
         &descriptor.url,
         Some(SqliteEndpointConfig {
            read_only: true,
            ..config.clone()
         }),
      )?
      .with_classifier(classifier.clone());
      Ok(Endpoint::new(descriptor.url.clone(), endpoint))
   })?;

   let primary = SqliteEndpoint::open(
      primary_url,
      Some(SqliteEndpointConfig {
         read_only: false,
         ..config
      }),
   )?
   .with_classifier(classifier.clone());

   tracing::debug!(primary = %primary_url, replicas = descriptors.len(), "Opened SQLite replica client");

   Ok(ReplicaClient::builder(primary).read_replicas_with(pool, Router::new(classifier)))
}

/// Open a primary and its replicas with default endpoint settings and no hooks.
pub fn connect(primary_url: &str, replicas: &ReplicaConfig) -> Result<SqliteReplicaClient> {
   open(primary_url, replicas, None)?.build()
}
