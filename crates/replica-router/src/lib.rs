//! # replica-router
//!
//! Decides whether a database operation runs on the primary or on one of a
//! set of read replicas.
//!
//! ## Core Types
//!
//! - **[`Router`]**: The routing decision, producing a [`Decision`]
//! - **[`OperationClassifier`]**: Maps operation names to [`OperationKind::Read`] or [`OperationKind::Write`]
//! - **[`RouteContext`]**: Per-call-chain state that can pin routing to the primary
//! - **[`ReplicaPool`]**: Non-empty replica set with random selection
//! - **[`Executor`]**, **[`TransactionalExecutor`]**, **[`Transaction`]**: Implemented by the wrapped client
//! - **[`Error`]**: Configuration errors
//!
//! ## Routing
//!
//! 1. A forced-primary context (explicit or transaction scope) always routes to the primary
//! 2. Writes, and any operation the classifier does not recognize, route to the primary
//! 3. Reads route to a randomly selected replica

mod classify;
mod context;
mod error;
mod executor;
mod operation;
mod pool;
mod router;

pub use classify::{CATALOG_VERSION, OperationClassifier, OperationKind, READ_OPERATIONS, WRITE_OPERATIONS};
pub use context::{PrimaryScope, RouteContext};
pub use error::{Error, Result};
pub use executor::{Endpoint, Executor, Transaction, TransactionalExecutor};
pub use operation::Operation;
pub use pool::ReplicaPool;
pub use router::{Decision, Reason, Router, Target};

pub use futures::future::BoxFuture;
