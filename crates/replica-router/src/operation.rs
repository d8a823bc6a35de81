//! Database operations as seen by the router

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A named database operation together with its arguments.
///
/// The router only ever looks at [`Operation::name`]. The model and the
/// arguments are carried through untouched to whichever endpoint ends up
/// executing the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
   /// Model (table) the operation targets, if any. Raw operations have none.
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub model: Option<String>,
   /// Operation name, e.g. `findMany` or `updateMany`
   pub name: String,
   /// Operation arguments, interpreted by the executing endpoint
   #[serde(default)]
   pub args: JsonValue,
}

impl Operation {
   /// Create an operation that is not bound to a model.
   pub fn new(name: impl Into<String>, args: JsonValue) -> Self {
      Self {
         model: None,
         name: name.into(),
         args,
      }
   }

   /// Create an operation against a model.
   pub fn on(model: impl Into<String>, name: impl Into<String>, args: JsonValue) -> Self {
      Self {
         model: Some(model.into()),
         name: name.into(),
         args,
      }
   }
}
