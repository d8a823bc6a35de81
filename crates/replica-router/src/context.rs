//! Per-call-chain routing context

use std::fmt;

/// Why a call chain is pinned to the primary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimaryScope {
   /// The caller asked for the primary explicitly
   Explicit,
   /// The call chain runs inside the transaction with this id
   Transaction(String),
}

impl fmt::Display for PrimaryScope {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         PrimaryScope::Explicit => f.write_str("explicit"),
         PrimaryScope::Transaction(id) => write!(f, "transaction {id}"),
      }
   }
}

/// Routing state owned by a single call chain.
///
/// A context is a plain value: deriving a forced-primary context returns a new
/// value and leaves the original untouched, so chains running concurrently
/// each see only their own context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteContext {
   scope: Option<PrimaryScope>,
}

impl RouteContext {
   /// Derive a context that routes everything to the primary.
   #[must_use]
   pub fn with_forced_primary(&self, scope: PrimaryScope) -> Self {
      Self { scope: Some(scope) }
   }

   pub fn force_primary(&self) -> bool {
      self.scope.is_some()
   }

   pub fn scope(&self) -> Option<&PrimaryScope> {
      self.scope.as_ref()
   }
}
