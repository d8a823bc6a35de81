//! Cross-cutting hooks around routed operations

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use replica_router::{Executor, Operation, RouteContext};
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use crate::ReplicaClient;

/// An operation on its way through the hook pipeline.
#[derive(Debug, Clone)]
pub struct Request {
   pub operation: Operation,
   /// Routing context of the call chain that issued the operation.
   ///
   /// Informational only: routing uses the issuing handle's context, so
   /// changing this field does not change where the operation goes.
   pub context: RouteContext,
}

/// Middleware around operation execution.
///
/// A hook observes or alters the request and calls [`Next::run`] to continue.
/// Not calling `next` ends the pipeline there.
pub trait QueryHook<E>: Send + Sync {
   fn call<'a>(&'a self, request: Request, next: Next<'a, E>) -> BoxFuture<'a, Result<JsonValue, E>>;
}

/// End of a pipeline.
pub(crate) enum Terminal<'a, E> {
   /// Execute directly on this executor
   Executor(&'a dyn Executor<Error = E>),
   /// Hand the request to the router of this client
   Router(&'a ReplicaClient<E>),
}

/// The rest of the pipeline after the current hook.
pub struct Next<'a, E> {
   hooks: &'a [Arc<dyn QueryHook<E>>],
   terminal: Terminal<'a, E>,
}

impl<'a, E: Send + 'static> Next<'a, E> {
   pub(crate) fn new(hooks: &'a [Arc<dyn QueryHook<E>>], terminal: Terminal<'a, E>) -> Self {
      Self { hooks, terminal }
   }

   /// Continue with the next hook, or execute if none are left.
   pub fn run(self, request: Request) -> BoxFuture<'a, Result<JsonValue, E>> {
      match self.hooks.split_first() {
         Some((hook, rest)) => {
            trace!(operation = %request.operation.name, remaining = rest.len(), "Entering hook");
            hook.call(request, Next::new(rest, self.terminal))
         }
         None => match self.terminal {
            Terminal::Executor(executor) => executor.execute(request.operation),
            Terminal::Router(client) => client.route(request),
         },
      }
   }
}

/// An executor wrapped in its own hook pipeline.
///
/// Used to instrument replicas: an operation routed to a replica bypasses the
/// client's post-router hooks and only passes through these.
pub struct Instrumented<E> {
   inner: Arc<dyn Executor<Error = E>>,
   hooks: Vec<Arc<dyn QueryHook<E>>>,
}

impl<E: Send + 'static> Instrumented<E> {
   pub fn new<X>(executor: X) -> Self
   where
      X: Executor<Error = E> + 'static,
   {
      Self {
         inner: Arc::new(executor),
         hooks: Vec::new(),
      }
   }

   pub fn hook<H>(mut self, hook: H) -> Self
   where
      H: QueryHook<E> + 'static,
   {
      self.hooks.push(Arc::new(hook));
      self
   }
}

impl<E: Send + 'static> Executor for Instrumented<E> {
   type Error = E;

   fn execute(&self, operation: Operation) -> BoxFuture<'_, Result<JsonValue, E>> {
      let request = Request {
         operation,
         context: RouteContext::default(),
      };
      Next::new(&self.hooks, Terminal::Executor(&*self.inner)).run(request)
   }
}

/// Logs every operation with its duration and outcome.
#[derive(Debug, Clone)]
pub struct TracingHook {
   label: String,
}

impl TracingHook {
   pub fn new(label: impl Into<String>) -> Self {
      Self {
         label: label.into(),
      }
   }
}

impl<E> QueryHook<E> for TracingHook
where
   E: fmt::Display + Send + 'static,
{
   fn call<'a>(&'a self, request: Request, next: Next<'a, E>) -> BoxFuture<'a, Result<JsonValue, E>> {
      Box::pin(async move {
         let operation = request.operation.name.clone();
         let started = Instant::now();
         let result = next.run(request).await;
         let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

         match &result {
            Ok(_) => debug!(label = %self.label, operation = %operation, elapsed_ms, "Operation completed"),
            Err(e) => debug!(label = %self.label, operation = %operation, elapsed_ms, error = %e, "Operation failed"),
         }

         result
      })
   }
}
