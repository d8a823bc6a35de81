//! The routing decision

use std::fmt;

use tracing::trace;

use crate::{OperationClassifier, OperationKind, PrimaryScope, ReplicaPool, RouteContext};

/// Where an operation goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
   Primary,
   /// Index into the [`ReplicaPool`] the decision was made against
   Replica(usize),
}

/// Why the target was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
   /// The call chain is pinned to the primary; classification was skipped
   ForcedPrimary(PrimaryScope),
   Write,
   Read,
   /// The classifier does not know the operation; treated as a write
   Unclassified,
}

/// Output of [`Router::route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
   pub target: Target,
   pub reason: Reason,
}

impl Decision {
   pub fn is_primary(&self) -> bool {
      self.target == Target::Primary
   }
}

impl fmt::Display for Decision {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match (&self.target, &self.reason) {
         (Target::Primary, Reason::ForcedPrimary(scope)) => write!(f, "primary ({scope})"),
         (Target::Primary, Reason::Unclassified) => f.write_str("primary (unclassified)"),
         (Target::Primary, _) => f.write_str("primary"),
         (Target::Replica(index), _) => write!(f, "replica #{index}"),
      }
   }
}

/// Decides between the primary and a replica for each operation.
///
/// Routing is a pure function of the operation name and the context, except
/// for the replica pick on the read path.
#[derive(Debug, Clone, Default)]
pub struct Router {
   classifier: OperationClassifier,
}

impl Router {
   pub fn new(classifier: OperationClassifier) -> Self {
      Self { classifier }
   }

   pub fn classifier(&self) -> &OperationClassifier {
      &self.classifier
   }

   pub fn route<T>(
      &self,
      operation: &str,
      context: &RouteContext,
      replicas: &ReplicaPool<T>,
   ) -> Decision {
      let decision = if let Some(scope) = context.scope() {
         Decision {
            target: Target::Primary,
            reason: Reason::ForcedPrimary(scope.clone()),
         }
      } else {
         match self.classifier.resolve(operation) {
            Some(OperationKind::Write) => Decision {
               target: Target::Primary,
               reason: Reason::Write,
            },
            Some(OperationKind::Read) => Decision {
               target: Target::Replica(replicas.select_index()),
               reason: Reason::Read,
            },
            None => Decision {
               target: Target::Primary,
               reason: Reason::Unclassified,
            },
         }
      };

      trace!(operation = %operation, decision = %decision, "Routing decision");
      decision
   }
}
