//! # sqlx-sqlite-endpoint
//!
//! SQLite endpoints for [`replica_router`], each wrapping an SQLx connection pool.
//!
//! ## Core Types
//!
//! - **[`SqliteEndpoint`]**: Pool-backed [`Executor`](replica_router::Executor) and
//!   [`TransactionalExecutor`](replica_router::TransactionalExecutor)
//! - **[`SqliteTransaction`]**: Open transaction holding a single connection
//! - **[`SqliteEndpointConfig`]**: Configuration for pool settings and read-only mode
//! - **[`Statement`]**: Query text and bind values carried in operation arguments
//! - **[`Error`]**: Error type for endpoint operations
//!
//! ## Behavior
//!
//! - **Lazy pools**: Opening an endpoint never touches the database
//! - **Read-only replicas**: Replica endpoints reject writes at the SQLite level
//! - **JSON rows**: Read operations return rows as JSON objects in column order

mod config;
mod decode;
mod endpoint;
mod error;
mod statement;
mod transaction;

// Re-export public types
pub use config::SqliteEndpointConfig;
pub use endpoint::SqliteEndpoint;
pub use error::{Error, Result};
pub use statement::Statement;
pub use transaction::SqliteTransaction;
