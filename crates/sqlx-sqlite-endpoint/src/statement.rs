//! SQL statements carried in operation arguments

use indexmap::IndexMap;
use replica_router::{Operation, OperationKind};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row};

use crate::decode::to_json;
use crate::{Error, Result};

/// Statement with query and bind values.
///
/// Operations sent to a SQLite endpoint carry one of these as their arguments:
///
/// ```json
/// { "query": "SELECT * FROM users WHERE id = $1", "values": [1] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
   pub query: String,
   #[serde(default)]
   pub values: Vec<JsonValue>,
}

impl Statement {
   pub fn new(query: impl Into<String>, values: Vec<JsonValue>) -> Self {
      Self {
         query: query.into(),
         values,
      }
   }

   /// Build an operation that carries this statement.
   pub fn into_operation(self, name: impl Into<String>) -> Operation {
      Operation::new(name, json!({ "query": self.query, "values": self.values }))
   }

   /// Extract the statement from an operation's arguments.
   pub fn from_operation(operation: &Operation) -> Result<Self> {
      Self::deserialize(&operation.args).map_err(|e| Error::InvalidStatement {
         operation: operation.name.clone(),
         reason: e.to_string(),
      })
   }

   fn build(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
      let mut q = sqlx::query(&self.query);
      for value in &self.values {
         q = bind_value(q, value.clone());
      }
      q
   }
}

/// Run a statement on any SQLite executor (pool or connection).
///
/// Reads return the decoded rows. Everything else returns the write result.
pub(crate) async fn run<'c, X>(executor: X, kind: OperationKind, statement: Statement) -> Result<JsonValue>
where
   X: sqlx::Executor<'c, Database = Sqlite>,
{
   let q = statement.build();
   match kind {
      OperationKind::Read => {
         let rows = q.fetch_all(executor).await?;
         Ok(JsonValue::Array(
            decode_rows(rows)?
               .into_iter()
               .map(|row| JsonValue::Object(row.into_iter().collect()))
               .collect(),
         ))
      }
      OperationKind::Write => {
         let result = q.execute(executor).await?;
         Ok(json!({
            "rowsAffected": result.rows_affected(),
            "lastInsertId": result.last_insert_rowid(),
         }))
      }
   }
}

/// Decode rows to JSON, preserving column order
pub(crate) fn decode_rows(rows: Vec<SqliteRow>) -> Result<Vec<IndexMap<String, JsonValue>>> {
   let mut values = Vec::new();
   for row in rows {
      let mut value = IndexMap::default();
      for (i, column) in row.columns().iter().enumerate() {
         let v = row.try_get_raw(i)?;
         value.insert(column.name().to_string(), to_json(v)?);
      }
      values.push(value);
   }
   Ok(values)
}

/// Helper function to bind a JSON value to a SQLx query
fn bind_value<'a>(
   query: Query<'a, Sqlite, SqliteArguments<'a>>,
   value: JsonValue,
) -> Query<'a, Sqlite, SqliteArguments<'a>> {
   match value {
      JsonValue::Null => query.bind(None::<JsonValue>),
      JsonValue::String(s) => query.bind(s),
      JsonValue::Bool(b) => query.bind(b),
      JsonValue::Number(number) => {
         // Preserve integer precision by binding as i64 when possible
         if let Some(int_val) = number.as_i64() {
            query.bind(int_val)
         } else if let Some(uint_val) = number.as_u64() {
            // u64 beyond i64::MAX does not fit SQLite's INTEGER, fall back to f64
            match i64::try_from(uint_val) {
               Ok(v) => query.bind(v),
               Err(_) => query.bind(uint_val as f64),
            }
         } else {
            query.bind(number.as_f64().unwrap_or_default())
         }
      }
      other => query.bind(other),
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_from_operation() {
      let op = Operation::new("findMany", json!({ "query": "SELECT 1", "values": [1, "a"] }));
      let statement = Statement::from_operation(&op).unwrap();
      assert_eq!(statement, Statement::new("SELECT 1", vec![json!(1), json!("a")]));
   }

   #[test]
   fn test_values_default_to_empty() {
      let op = Operation::new("count", json!({ "query": "SELECT count(*) FROM t" }));
      assert!(Statement::from_operation(&op).unwrap().values.is_empty());
   }

   #[test]
   fn test_missing_query_is_invalid() {
      let op = Operation::on("user", "findMany", json!({ "where": { "id": 1 } }));
      let err = Statement::from_operation(&op).unwrap_err();
      assert_eq!(err.error_code(), "INVALID_STATEMENT");
      assert!(err.to_string().contains("findMany"));
   }

   #[test]
   fn test_into_operation() {
      let op = Statement::new("DELETE FROM t", vec![]).into_operation("deleteMany");
      assert_eq!(op.name, "deleteMany");
      assert_eq!(op.args["query"], json!("DELETE FROM t"));
   }
}
