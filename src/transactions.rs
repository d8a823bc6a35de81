//! Batched and interactive transactions pinned to the primary

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use replica_router::{Operation, PrimaryScope, Transaction};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::ReplicaClient;
use crate::client::ExecutionPath;

impl<E> ReplicaClient<E>
where
   E: fmt::Display + Send + 'static,
{
   /// Execute operations in order inside a single transaction on the primary.
   ///
   /// Every operation, reads included, goes to the primary. The transaction
   /// commits only if all operations succeed. On the first failure the
   /// remaining operations are not issued, the transaction is rolled back and
   /// the failure is returned unchanged.
   ///
   /// Called on a handle that is already inside a transaction, the operations
   /// join that transaction. Committing or rolling back is then left to it.
   pub async fn transaction(&self, operations: Vec<Operation>) -> Result<Vec<JsonValue>, E> {
      if let Some(id) = self.enclosing_transaction() {
         debug!(tx_id = %id, operations = operations.len(), "Batched transaction joined enclosing transaction");
         let mut results = Vec::with_capacity(operations.len());
         for operation in operations {
            results.push(self.query(operation).await?);
         }
         return Ok(results);
      }

      let tx = self.shared.primary.begin().await?;
      let scoped = self.in_transaction(&tx);
      debug!(tx_id = %tx.id(), operations = operations.len(), "Batched transaction started");

      let mut results = Vec::with_capacity(operations.len());
      for operation in operations {
         match scoped.query(operation).await {
            Ok(result) => results.push(result),
            Err(e) => {
               abort(&*tx, &e).await;
               return Err(e);
            }
         }
      }

      tx.commit().await?;
      Ok(results)
   }

   /// Run `callback` with a handle whose operations all execute inside one
   /// transaction on the primary.
   ///
   /// Commits when the callback returns `Ok`, rolls back when it returns
   /// `Err`. The transaction is finished once this returns, so a handle kept
   /// past the callback can no longer execute operations.
   ///
   /// Nested inside another transaction, the callback runs in that
   /// transaction and its result is handed back without committing.
   ///
   /// # Example
   ///
   /// ```no_run
   /// # use sqlx_read_replicas::sqlite::SqliteReplicaClient;
   /// # use sqlx_sqlite_endpoint::Statement;
   /// # async fn example(client: SqliteReplicaClient) -> Result<(), sqlx_sqlite_endpoint::Error> {
   /// let total = client
   ///    .interactive_transaction(|tx| async move {
   ///       let rows = tx
   ///          .query(Statement::new("SELECT sum(balance) AS total FROM accounts", vec![]).into_operation("aggregate"))
   ///          .await?;
   ///       tx.query(Statement::new("UPDATE accounts SET audited = 1", vec![]).into_operation("updateMany"))
   ///          .await?;
   ///       Ok(rows)
   ///    })
   ///    .await?;
   /// # Ok(())
   /// # }
   /// ```
   pub async fn interactive_transaction<F, Fut, T>(&self, callback: F) -> Result<T, E>
   where
      F: FnOnce(ReplicaClient<E>) -> Fut,
      Fut: Future<Output = Result<T, E>>,
   {
      if let Some(id) = self.enclosing_transaction() {
         debug!(tx_id = %id, "Interactive transaction joined enclosing transaction");
         return callback(self.clone()).await;
      }

      let tx = self.shared.primary.begin().await?;
      debug!(tx_id = %tx.id(), "Interactive transaction started");

      match callback(self.in_transaction(&tx)).await {
         Ok(value) => {
            tx.commit().await?;
            Ok(value)
         }
         Err(e) => {
            abort(&*tx, &e).await;
            Err(e)
         }
      }
   }

   /// Id of the transaction this handle already runs in, if any.
   fn enclosing_transaction(&self) -> Option<&str> {
      match self.context.scope() {
         Some(PrimaryScope::Transaction(id)) => Some(id),
         _ => None,
      }
   }

   /// A handle that routes everything into `tx`.
   fn in_transaction(&self, tx: &Arc<dyn Transaction<Error = E>>) -> Self {
      Self {
         shared: Arc::clone(&self.shared),
         context: self
            .context
            .with_forced_primary(PrimaryScope::Transaction(tx.id().to_string())),
         path: ExecutionPath::Instrumented,
         executor: tx.clone(),
      }
   }
}

/// Roll back after a failure. A failed rollback is logged; the original
/// failure is what the caller gets.
async fn abort<E: fmt::Display + Send + 'static>(tx: &dyn Transaction<Error = E>, cause: &E) {
   debug!(tx_id = %tx.id(), error = %cause, "Transaction aborted");
   if let Err(rollback_err) = tx.rollback().await {
      warn!(tx_id = %tx.id(), error = %cause, rollback_error = %rollback_err, "Rollback failed");
   }
}
