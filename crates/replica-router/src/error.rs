//! Error types for replica-router

use thiserror::Error;

/// Configuration errors raised while assembling a router.
///
/// These are always returned synchronously at setup time. Failures of the
/// operations themselves are never wrapped in this type: they keep the error
/// type of the executor that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
   /// The replica set was empty (an empty list or no list at all)
   #[error("At least one replica URL must be specified")]
   NoReplicas,

   /// Weighted replica selection was requested but no replica can ever be chosen
   #[error("replica weights must include at least one non-zero weight")]
   InvalidWeights,

   /// The number of weights does not match the number of replicas
   #[error("got {weights} replica weights for {replicas} replicas")]
   WeightCountMismatch { replicas: usize, weights: usize },
}

impl Error {
   /// Extract a structured error code from the error type.
   pub fn error_code(&self) -> &'static str {
      match self {
         Error::NoReplicas => "NO_REPLICAS",
         Error::InvalidWeights => "INVALID_WEIGHTS",
         Error::WeightCountMismatch { .. } => "WEIGHT_COUNT_MISMATCH",
      }
   }
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_no_replicas_message() {
      let err = Error::NoReplicas;
      assert_eq!(err.to_string(), "At least one replica URL must be specified");
      assert_eq!(err.error_code(), "NO_REPLICAS");
   }

   #[test]
   fn test_weight_count_mismatch_message() {
      let err = Error::WeightCountMismatch {
         replicas: 3,
         weights: 2,
      };
      assert_eq!(err.error_code(), "WEIGHT_COUNT_MISMATCH");
      assert!(err.to_string().contains("2 replica weights for 3 replicas"));
   }
}
