//! Executor traits implemented by the backing database clients

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value as JsonValue;

use crate::Operation;

/// Something that can run an [`Operation`] against a database connection.
///
/// Implemented by the underlying client the router wraps. The router never
/// inspects or wraps `Self::Error`: whatever an executor fails with is what
/// the caller sees.
pub trait Executor: Send + Sync {
   type Error: Send + 'static;

   fn execute(&self, operation: Operation) -> BoxFuture<'_, Result<JsonValue, Self::Error>>;
}

/// An executor able to open transactions. Required of the primary endpoint.
pub trait TransactionalExecutor: Executor {
   /// Begin a new transaction.
   ///
   /// The transaction is shared (`&self` methods) so that the coordinator and
   /// the handle given to an interactive callback can both hold it.
   #[allow(clippy::type_complexity)]
   fn begin(
      &self,
   ) -> BoxFuture<'_, Result<Arc<dyn Transaction<Error = Self::Error>>, Self::Error>>;
}

/// An open transaction on the primary.
///
/// Executing after [`commit`](Transaction::commit) or
/// [`rollback`](Transaction::rollback) must fail.
pub trait Transaction: Executor {
   fn id(&self) -> &str;

   fn commit(&self) -> BoxFuture<'_, Result<(), Self::Error>>;

   fn rollback(&self) -> BoxFuture<'_, Result<(), Self::Error>>;
}

/// Labeled handle to an executor.
///
/// Endpoints are owned by the caller. Cloning an endpoint clones the `Arc`,
/// never the connection behind it.
pub struct Endpoint<E> {
   label: Arc<str>,
   executor: Arc<dyn Executor<Error = E>>,
}

impl<E: Send + 'static> Endpoint<E> {
   pub fn new<X>(label: impl Into<String>, executor: X) -> Self
   where
      X: Executor<Error = E> + 'static,
   {
      Self::from_arc(label, Arc::new(executor))
   }

   pub fn from_arc(label: impl Into<String>, executor: Arc<dyn Executor<Error = E>>) -> Self {
      Self {
         label: Arc::from(label.into()),
         executor,
      }
   }

   /// Label identifying this endpoint in logs and decisions
   pub fn label(&self) -> &str {
      &self.label
   }

   pub fn executor(&self) -> &Arc<dyn Executor<Error = E>> {
      &self.executor
   }
}

impl<E: Send + 'static> Executor for Endpoint<E> {
   type Error = E;

   fn execute(&self, operation: Operation) -> BoxFuture<'_, Result<JsonValue, E>> {
      self.executor.execute(operation)
   }
}

impl<E> Clone for Endpoint<E> {
   fn clone(&self) -> Self {
      Self {
         label: Arc::clone(&self.label),
         executor: Arc::clone(&self.executor),
      }
   }
}

impl<E> fmt::Debug for Endpoint<E> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("Endpoint")
         .field("label", &self.label)
         .finish_non_exhaustive()
   }
}
