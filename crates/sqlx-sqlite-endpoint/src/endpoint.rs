//! SQLite endpoint backed by an SQLx connection pool

use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;
use replica_router::{Executor, Operation, OperationClassifier, OperationKind, Transaction, TransactionalExecutor};
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::debug;

use crate::statement::{Statement, run};
use crate::transaction::SqliteTransaction;
use crate::{Error, Result, SqliteEndpointConfig};

/// A SQLite database reachable through a connection pool.
///
/// ## Architecture
///
/// - **`pool`**: Lazily connecting pool. Opening an endpoint performs no I/O,
///   so routers built from endpoints can be assembled synchronously.
/// - **`classifier`**: Decides whether an operation fetches rows or executes a
///   write. Names the classifier does not know are executed as writes.
/// - **`read_only`**: Replica endpoints are opened read-only so a misrouted
///   write fails instead of diverging from the primary.
#[derive(Debug, Clone)]
pub struct SqliteEndpoint {
   pool: Pool<Sqlite>,
   url: Arc<str>,
   read_only: bool,
   classifier: OperationClassifier,
}

impl SqliteEndpoint {
   /// Open an endpoint for a SQLite URL such as `sqlite://app.db` or `sqlite::memory:`.
   ///
   /// Fails only if the URL cannot be parsed. Connection errors surface on
   /// first use. Must be called from within a Tokio runtime.
   pub fn open(url: &str, custom_config: Option<SqliteEndpointConfig>) -> Result<Self> {
      let config = custom_config.unwrap_or_default();

      let options = SqliteConnectOptions::from_str(url)
         .map_err(|source| Error::InvalidUrl {
            url: url.to_string(),
            source,
         })?
         .read_only(config.read_only)
         .create_if_missing(!config.read_only);

      let pool = SqlitePoolOptions::new()
         .max_connections(config.max_connections)
         .idle_timeout(config.idle_timeout)
         .connect_lazy_with(options);

      debug!(url = %url, read_only = config.read_only, "Opened SQLite endpoint");

      Ok(Self {
         pool,
         url: Arc::from(url),
         read_only: config.read_only,
         classifier: OperationClassifier::default(),
      })
   }

   /// Use a custom classifier to decide which operations fetch rows.
   pub fn with_classifier(mut self, classifier: OperationClassifier) -> Self {
      self.classifier = classifier;
      self
   }

   pub fn url(&self) -> &str {
      &self.url
   }

   pub fn is_read_only(&self) -> bool {
      self.read_only
   }

   /// Get a reference to the underlying connection pool.
   pub fn pool(&self) -> &Pool<Sqlite> {
      &self.pool
   }

   /// Close all pooled connections. Subsequent operations fail.
   pub async fn close(&self) {
      self.pool.close().await;
      debug!(url = %self.url, "Closed SQLite endpoint");
   }

   pub(crate) fn kind_of(classifier: &OperationClassifier, operation: &Operation) -> OperationKind {
      classifier
         .lookup(&operation.name)
         .unwrap_or(OperationKind::Write)
   }
}

impl Executor for SqliteEndpoint {
   type Error = Error;

   fn execute(&self, operation: Operation) -> BoxFuture<'_, Result<JsonValue>> {
      Box::pin(async move {
         let statement = Statement::from_operation(&operation)?;
         let kind = Self::kind_of(&self.classifier, &operation);
         run(&self.pool, kind, statement).await
      })
   }
}

impl TransactionalExecutor for SqliteEndpoint {
   fn begin(&self) -> BoxFuture<'_, Result<Arc<dyn Transaction<Error = Error>>>> {
      Box::pin(async move {
         let tx = self.pool.begin().await?;
         let tx = SqliteTransaction::new(tx, self.classifier.clone());
         debug!(url = %self.url, tx_id = %tx.id(), "Transaction started");
         Ok(Arc::new(tx) as Arc<dyn Transaction<Error = Error>>)
      })
   }
}
