//! The routing client and its builder

use std::sync::Arc;

use futures::future::BoxFuture;
use replica_router::{
   Decision, Endpoint, Error as ConfigError, Executor, Operation, PrimaryScope, ReplicaPool,
   RouteContext, Router, Target, TransactionalExecutor,
};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::hooks::{Next, QueryHook, Request, Terminal};
use crate::Result;

/// How a client handle executes operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionPath {
   /// Through the router and the hooks registered after it
   Instrumented,
   /// Straight to the primary, skipping the router and every later hook
   Direct,
}

/// State shared by every handle derived from one client
pub(crate) struct Shared<E> {
   pub(crate) primary: Arc<dyn TransactionalExecutor<Error = E>>,
   pub(crate) replicas: ReplicaPool<Endpoint<E>>,
   pub(crate) router: Router,
   /// Hooks registered before the router
   pub(crate) before: Vec<Arc<dyn QueryHook<E>>>,
   /// Hooks registered after the router. Skipped by replica reads and by `primary()`.
   pub(crate) after: Vec<Arc<dyn QueryHook<E>>>,
}

/// Database client that sends reads to replicas and everything else to the primary.
///
/// Handles are cheap to clone. Each handle carries its own [`RouteContext`],
/// so the handles returned by [`primary`](Self::primary) and the ones given
/// to transaction callbacks never affect other call chains.
///
/// # Example
///
/// ```no_run
/// use serde_json::json;
/// use sqlx_read_replicas::{ReplicaConfig, sqlite};
/// use sqlx_sqlite_endpoint::Statement;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = sqlite::connect("sqlite://primary.db", &ReplicaConfig::new("sqlite://replica.db"))?;
///
/// // Served by the replica
/// let users = client
///    .query(Statement::new("SELECT * FROM users", vec![]).into_operation("findMany"))
///    .await?;
///
/// // Served by the primary
/// client
///    .query(Statement::new("UPDATE users SET active = $1", vec![json!(true)]).into_operation("updateMany"))
///    .await?;
/// # Ok(())
/// # }
/// ```
pub struct ReplicaClient<E> {
   pub(crate) shared: Arc<Shared<E>>,
   pub(crate) context: RouteContext,
   pub(crate) path: ExecutionPath,
   /// The primary, or the open transaction for transaction-scoped handles
   pub(crate) executor: Arc<dyn Executor<Error = E>>,
}

impl<E> Clone for ReplicaClient<E> {
   fn clone(&self) -> Self {
      Self {
         shared: Arc::clone(&self.shared),
         context: self.context.clone(),
         path: self.path,
         executor: Arc::clone(&self.executor),
      }
   }
}

impl<E: Send + 'static> ReplicaClient<E> {
   /// Start building a client around a primary executor.
   pub fn builder<P>(primary: P) -> ReplicaClientBuilder<E>
   where
      P: TransactionalExecutor<Error = E> + 'static,
   {
      ReplicaClientBuilder::new(primary)
   }

   /// Execute an operation on whichever endpoint the router picks.
   pub fn query(&self, operation: Operation) -> BoxFuture<'_, std::result::Result<JsonValue, E>> {
      let request = Request {
         operation,
         context: self.context.clone(),
      };

      let terminal = match self.path {
         ExecutionPath::Instrumented => Terminal::Router(self),
         ExecutionPath::Direct => Terminal::Executor(&*self.executor),
      };

      Next::new(&self.shared.before, terminal).run(request)
   }

   /// Execute `name` on `model` with `args`.
   pub fn run(
      &self,
      model: impl Into<String>,
      name: impl Into<String>,
      args: JsonValue,
   ) -> BoxFuture<'_, std::result::Result<JsonValue, E>> {
      self.query(Operation::on(model, name, args))
   }

   /// A handle pinned to the primary.
   ///
   /// Operations issued through it skip the router and every hook registered
   /// after the router. Hooks registered before the router still run.
   pub fn primary(&self) -> Self {
      let context = if self.context.force_primary() {
         self.context.clone()
      } else {
         self.context.with_forced_primary(PrimaryScope::Explicit)
      };

      Self {
         shared: Arc::clone(&self.shared),
         context,
         path: ExecutionPath::Direct,
         executor: Arc::clone(&self.executor),
      }
   }

   /// A randomly selected replica, for reading from a replica explicitly.
   pub fn replica(&self) -> &Endpoint<E> {
      self.shared.replicas.select()
   }

   pub fn replicas(&self) -> &ReplicaPool<Endpoint<E>> {
      &self.shared.replicas
   }

   pub fn context(&self) -> &RouteContext {
      &self.context
   }

   /// The decision the router would make for `operation` on this handle.
   pub fn decide(&self, operation: &str) -> Decision {
      self
         .shared
         .router
         .route(operation, &self.context, &self.shared.replicas)
   }

   pub(crate) fn route(&self, request: Request) -> BoxFuture<'_, std::result::Result<JsonValue, E>> {
      let decision = self.decide(&request.operation.name);

      match decision.target {
         Target::Primary => {
            debug!(operation = %request.operation.name, target = %decision, "Routing operation");
            Next::new(&self.shared.after, Terminal::Executor(&*self.executor)).run(request)
         }
         Target::Replica(index) => {
            let replica = &self.shared.replicas[index];
            debug!(operation = %request.operation.name, target = %decision, replica = %replica.label(), "Routing operation");
            replica.execute(request.operation)
         }
      }
   }
}

/// Builder for [`ReplicaClient`].
///
/// Hooks are ordered relative to the router: hooks added before
/// [`read_replicas`](Self::read_replicas) run before routing, hooks added
/// after it only run for operations that end up on the primary.
pub struct ReplicaClientBuilder<E> {
   primary: Arc<dyn TransactionalExecutor<Error = E>>,
   executor: Arc<dyn Executor<Error = E>>,
   before: Vec<Arc<dyn QueryHook<E>>>,
   after: Vec<Arc<dyn QueryHook<E>>>,
   replicas: Option<(ReplicaPool<Endpoint<E>>, Router)>,
}

impl<E: Send + 'static> ReplicaClientBuilder<E> {
   fn new<P>(primary: P) -> Self
   where
      P: TransactionalExecutor<Error = E> + 'static,
   {
      let primary = Arc::new(primary);
      Self {
         executor: primary.clone(),
         primary,
         before: Vec::new(),
         after: Vec::new(),
         replicas: None,
      }
   }

   /// Register a hook at the current position in the pipeline.
   pub fn hook<H>(mut self, hook: H) -> Self
   where
      H: QueryHook<E> + 'static,
   {
      let hook: Arc<dyn QueryHook<E>> = Arc::new(hook);
      if self.replicas.is_some() {
         self.after.push(hook);
      } else {
         self.before.push(hook);
      }
      self
   }

   /// Install the router with the default classifier.
   pub fn read_replicas(self, replicas: ReplicaPool<Endpoint<E>>) -> Self {
      self.read_replicas_with(replicas, Router::default())
   }

   /// Install the router with a custom [`Router`].
   pub fn read_replicas_with(mut self, replicas: ReplicaPool<Endpoint<E>>, router: Router) -> Self {
      debug!(replicas = replicas.len(), "Read replicas installed");
      self.replicas = Some((replicas, router));
      self
   }

   /// Finish the client. Fails if no replicas were installed.
   pub fn build(self) -> Result<ReplicaClient<E>> {
      let (replicas, router) = self.replicas.ok_or(ConfigError::NoReplicas)?;

      Ok(ReplicaClient {
         shared: Arc::new(Shared {
            primary: self.primary,
            replicas,
            router,
            before: self.before,
            after: self.after,
         }),
         context: RouteContext::default(),
         path: ExecutionPath::Instrumented,
         executor: self.executor,
      })
   }
}
