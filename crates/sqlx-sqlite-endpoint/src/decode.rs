//! SQLite value to JSON decoding

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteValueRef;
use sqlx::{TypeInfo, Value, ValueRef};

use crate::{Error, Result};

/// Decode a raw SQLite value by its storage class.
///
/// BLOBs are returned base64 encoded. Non-finite floats have no JSON
/// representation and decode to null.
pub(crate) fn to_json(value: SqliteValueRef<'_>) -> Result<JsonValue> {
   if value.is_null() {
      return Ok(JsonValue::Null);
   }

   let value = ValueRef::to_owned(&value);
   let type_name = value.type_info().name().to_string();

   let json = match type_name.as_str() {
      "INTEGER" | "BOOLEAN" => JsonValue::from(value.try_decode_unchecked::<i64>()?),
      "REAL" | "NUMERIC" => serde_json::Number::from_f64(value.try_decode_unchecked::<f64>()?)
         .map(JsonValue::Number)
         .unwrap_or(JsonValue::Null),
      "TEXT" | "DATE" | "TIME" | "DATETIME" => {
         JsonValue::String(value.try_decode_unchecked::<String>()?)
      }
      "BLOB" => JsonValue::String(STANDARD.encode(value.try_decode_unchecked::<Vec<u8>>()?)),
      "NULL" => JsonValue::Null,
      _ => return Err(Error::UnsupportedDatatype(type_name)),
   };

   Ok(json)
}
