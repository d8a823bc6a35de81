//! Transactions on a SQLite endpoint

use futures::future::BoxFuture;
use replica_router::{Executor, Operation, OperationClassifier, Transaction};
use serde_json::Value as JsonValue;
use sqlx::Sqlite;
use tokio::sync::Mutex;
use tracing::debug;

use crate::endpoint::SqliteEndpoint;
use crate::statement::{Statement, run};
use crate::{Error, Result};

/// Open transaction holding one pooled connection.
///
/// The connection is released on commit or rollback. Dropping an unfinished
/// transaction rolls it back.
pub struct SqliteTransaction {
   id: String,
   tx: Mutex<Option<sqlx::Transaction<'static, Sqlite>>>,
   classifier: OperationClassifier,
}

impl SqliteTransaction {
   pub(crate) fn new(tx: sqlx::Transaction<'static, Sqlite>, classifier: OperationClassifier) -> Self {
      Self {
         id: uuid::Uuid::new_v4().to_string(),
         tx: Mutex::new(Some(tx)),
         classifier,
      }
   }

   async fn take(&self) -> Result<sqlx::Transaction<'static, Sqlite>> {
      self
         .tx
         .lock()
         .await
         .take()
         .ok_or(Error::TransactionAlreadyFinalized)
   }
}

impl Executor for SqliteTransaction {
   type Error = Error;

   fn execute(&self, operation: Operation) -> BoxFuture<'_, Result<JsonValue>> {
      Box::pin(async move {
         let statement = Statement::from_operation(&operation)?;
         let kind = SqliteEndpoint::kind_of(&self.classifier, &operation);

         let mut guard = self.tx.lock().await;
         let tx = guard.as_mut().ok_or(Error::TransactionAlreadyFinalized)?;
         run(&mut **tx, kind, statement).await
      })
   }
}

impl Transaction for SqliteTransaction {
   fn id(&self) -> &str {
      &self.id
   }

   fn commit(&self) -> BoxFuture<'_, Result<()>> {
      Box::pin(async move {
         self.take().await?.commit().await?;
         debug!(tx_id = %self.id, "Transaction committed");
         Ok(())
      })
   }

   fn rollback(&self) -> BoxFuture<'_, Result<()>> {
      Box::pin(async move {
         self.take().await?.rollback().await?;
         debug!(tx_id = %self.id, "Transaction rolled back");
         Ok(())
      })
   }
}

impl Drop for SqliteTransaction {
   fn drop(&mut self) {
      if self.tx.get_mut().is_some() {
         debug!(tx_id = %self.id, "Dropping unfinished transaction (will auto-rollback)");
      }
   }
}
