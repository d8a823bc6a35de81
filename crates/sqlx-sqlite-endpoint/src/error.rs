//! Error types for sqlx-sqlite-endpoint

use thiserror::Error;

/// Errors that may occur when executing operations on a SQLite endpoint
#[derive(Error, Debug)]
pub enum Error {
   /// Error from the sqlx library. Standard sqlx errors are converted to this variant
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// The endpoint URL could not be parsed as SQLite connect options
   #[error("invalid SQLite URL '{url}': {source}")]
   InvalidUrl {
      url: String,
      #[source]
      source: sqlx::Error,
   },

   /// Operation arguments did not carry a usable statement
   #[error("operation '{operation}' has no valid statement: {reason}")]
   InvalidStatement { operation: String, reason: String },

   /// SQLite type that cannot be mapped to JSON
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// Transaction has already been committed or rolled back
   #[error("transaction has already been finalized (committed or rolled back)")]
   TransactionAlreadyFinalized,
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::InvalidUrl { .. } => "INVALID_URL".to_string(),
         Error::InvalidStatement { .. } => "INVALID_STATEMENT".to_string(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
         Error::TransactionAlreadyFinalized => "TRANSACTION_ALREADY_FINALIZED".to_string(),
      }
   }
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_error_code_sqlx_non_database() {
      // RowNotFound is not a database error, so no SQLite code
      let err = Error::Sqlx(sqlx::Error::RowNotFound);
      assert_eq!(err.error_code(), "SQLX_ERROR");
   }

   #[test]
   fn test_error_code_invalid_statement() {
      let err = Error::InvalidStatement {
         operation: "findMany".into(),
         reason: "missing 'query'".into(),
      };
      assert_eq!(err.error_code(), "INVALID_STATEMENT");
      assert!(err.to_string().contains("findMany"));
      assert!(err.to_string().contains("missing 'query'"));
   }

   #[test]
   fn test_error_code_transaction_already_finalized() {
      assert_eq!(
         Error::TransactionAlreadyFinalized.error_code(),
         "TRANSACTION_ALREADY_FINALIZED"
      );
   }

   #[test]
   fn test_error_code_unsupported_datatype() {
      let err = Error::UnsupportedDatatype("WEIRD".into());
      assert_eq!(err.error_code(), "UNSUPPORTED_DATATYPE");
   }
}
