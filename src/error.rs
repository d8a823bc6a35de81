/// Result type alias for client setup.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while setting up a [`ReplicaClient`](crate::ReplicaClient).
///
/// Operation failures are not represented here: they are returned with the
/// executor's own error type, unchanged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Invalid replica configuration (e.g. an empty replica set).
   #[error(transparent)]
   Configuration(#[from] replica_router::Error),

   /// A SQLite endpoint could not be opened.
   #[error(transparent)]
   Endpoint(#[from] sqlx_sqlite_endpoint::Error),
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> String {
      match self {
         Error::Configuration(e) => e.error_code().to_string(),
         Error::Endpoint(e) => e.error_code(),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_configuration_error_is_transparent() {
      let err = Error::from(replica_router::Error::NoReplicas);
      assert_eq!(err.to_string(), "At least one replica URL must be specified");
      assert_eq!(err.error_code(), "NO_REPLICAS");
   }

   #[test]
   fn test_endpoint_error_code() {
      let err = Error::from(sqlx_sqlite_endpoint::Error::TransactionAlreadyFinalized);
      assert_eq!(err.error_code(), "TRANSACTION_ALREADY_FINALIZED");
   }
}
