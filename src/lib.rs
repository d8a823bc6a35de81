//! # sqlx-read-replicas
//!
//! Read replica routing in front of a database client. Reads go to a
//! randomly chosen replica; writes, unrecognized operations and everything
//! inside a transaction go to the primary.
//!
//! ## Core Types
//!
//! - **[`ReplicaClient`]**: Routing client with a hook pipeline and transactions
//! - **[`ReplicaClientBuilder`]**: Assembles primary, replicas and hooks
//! - **[`ReplicaConfig`]**: Serde-friendly replica configuration
//! - **[`QueryHook`]**: Middleware around operation execution
//! - **[`Error`]**: Setup errors
//!
//! ## Escape hatches
//!
//! - [`ReplicaClient::primary`] pins a call chain to the primary and skips
//!   every hook registered after the router
//! - [`ReplicaClient::replica`] hands out a replica endpoint directly
//!
//! The [`sqlite`] module wires in SQLite endpoints from `sqlx-sqlite-endpoint`.

mod client;
mod config;
mod error;
mod hooks;
pub mod sqlite;
mod transactions;

pub use client::{ReplicaClient, ReplicaClientBuilder};
pub use config::{ReplicaConfig, ReplicaDescriptor, ReplicaUrls};
pub use error::{Error, Result};
pub use hooks::{Instrumented, Next, QueryHook, Request, TracingHook};

// Re-export the routing core
pub use replica_router::{
   Decision, Endpoint, Executor, Operation, OperationClassifier, OperationKind, PrimaryScope,
   Reason, ReplicaPool, RouteContext, Router, Target, Transaction, TransactionalExecutor,
};
