//! Read/write classification of operation names

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Version of the operation catalog below. Bump when names are added or moved.
pub const CATALOG_VERSION: u32 = 1;

/// Operations that never modify data and may be served by a replica.
pub const READ_OPERATIONS: &[&str] = &[
   "find",
   "findUnique",
   "findUniqueOrThrow",
   "findFirst",
   "findFirstOrThrow",
   "findMany",
   "count",
   "aggregate",
   "groupBy",
   "findRaw",
   "aggregateRaw",
];

/// Operations known to modify data.
///
/// Raw queries are listed here as well: the statement text is opaque, so a
/// raw query is assumed to write.
pub const WRITE_OPERATIONS: &[&str] = &[
   "create",
   "createMany",
   "createManyAndReturn",
   "update",
   "updateMany",
   "updateManyAndReturn",
   "upsert",
   "delete",
   "deleteMany",
   "executeRaw",
   "executeRawUnsafe",
   "queryRaw",
   "queryRawUnsafe",
   "runCommandRaw",
];

/// Routing class of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
   Read,
   Write,
}

impl fmt::Display for OperationKind {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         OperationKind::Read => f.write_str("read"),
         OperationKind::Write => f.write_str("write"),
      }
   }
}

/// Maps operation names to [`OperationKind`].
///
/// Lookup order is: overrides, then the built-in catalog, then
/// [`OperationKind::Write`] for anything unrecognized.
#[derive(Debug, Clone)]
pub struct OperationClassifier {
   table: HashMap<String, OperationKind>,
   overrides: HashMap<String, OperationKind>,
}

impl Default for OperationClassifier {
   fn default() -> Self {
      let table = READ_OPERATIONS
         .iter()
         .map(|name| (name.to_string(), OperationKind::Read))
         .chain(
            WRITE_OPERATIONS
               .iter()
               .map(|name| (name.to_string(), OperationKind::Write)),
         )
         .collect();

      Self {
         table,
         overrides: HashMap::new(),
      }
   }
}

impl OperationClassifier {
   pub fn new() -> Self {
      Self::default()
   }

   /// Force the classification of one operation name.
   pub fn with_override(mut self, name: impl Into<String>, kind: OperationKind) -> Self {
      self.overrides.insert(name.into(), kind);
      self
   }

   /// Apply several overrides at once.
   pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
   where
      I: IntoIterator<Item = (S, OperationKind)>,
      S: Into<String>,
   {
      self
         .overrides
         .extend(overrides.into_iter().map(|(name, kind)| (name.into(), kind)));
      self
   }

   /// Classify an operation name. Unknown names are writes.
   pub fn classify(&self, name: &str) -> OperationKind {
      self.resolve(name).unwrap_or(OperationKind::Write)
   }

   /// Like [`lookup`](Self::lookup), but an unknown name is logged.
   pub fn resolve(&self, name: &str) -> Option<OperationKind> {
      let kind = self.lookup(name);
      if kind.is_none() {
         warn!(
            operation = %name,
            catalog_version = CATALOG_VERSION,
            "Unrecognized operation, routing to primary"
         );
      }
      kind
   }

   /// Whether the name is covered by an override or the catalog.
   pub fn is_known(&self, name: &str) -> bool {
      self.lookup(name).is_some()
   }

   /// Classification without the write default and without logging.
   pub fn lookup(&self, name: &str) -> Option<OperationKind> {
      self
         .overrides
         .get(name)
         .or_else(|| self.table.get(name))
         .copied()
   }
}
