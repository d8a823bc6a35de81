use replica_router::{Executor, Operation, Transaction, TransactionalExecutor};
use serde_json::{Value as JsonValue, json};
use sqlx_sqlite_endpoint::{Error, SqliteEndpoint, SqliteEndpointConfig, Statement};
use tempfile::TempDir;

fn db_url(temp_dir: &TempDir, name: &str) -> String {
   format!("sqlite://{}", temp_dir.path().join(name).display())
}

fn create_test_endpoint() -> (SqliteEndpoint, TempDir) {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let endpoint = SqliteEndpoint::open(&db_url(&temp_dir, "test.db"), None)
      .expect("Failed to open test endpoint");

   (endpoint, temp_dir)
}

fn write(query: &str, values: Vec<JsonValue>) -> Operation {
   Statement::new(query, values).into_operation("executeRaw")
}

fn read(query: &str, values: Vec<JsonValue>) -> Operation {
   Statement::new(query, values).into_operation("findMany")
}

#[tokio::test]
async fn test_execute_and_write_result() {
   let (db, _temp) = create_test_endpoint();

   // DDL returns 0 rows affected
   let result = db
      .execute(write("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", vec![]))
      .await
      .unwrap();

   assert_eq!(result["rowsAffected"], json!(0));

   let result = db
      .execute(write("INSERT INTO t (name) VALUES ($1)", vec![json!("Alice")]))
      .await
      .unwrap();

   assert_eq!(result, json!({ "rowsAffected": 1, "lastInsertId": 1 }));

   let result = db
      .execute(write("INSERT INTO t (name) VALUES ($1)", vec![json!("Bob")]))
      .await
      .unwrap();

   assert_eq!(result, json!({ "rowsAffected": 1, "lastInsertId": 2 }));

   // UPDATE affects multiple rows
   let result = db
      .execute(
         Statement::new("UPDATE t SET name = 'X' WHERE id > 0", vec![]).into_operation("updateMany"),
      )
      .await
      .unwrap();

   assert_eq!(result["rowsAffected"], json!(2));

   db.close().await;
}

#[tokio::test]
async fn test_read_operations_return_rows() {
   let (db, _temp) = create_test_endpoint();
   db.execute(write(
      "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, active INT)",
      vec![],
   ))
   .await
   .unwrap();

   // Empty table returns empty array
   let rows = db.execute(read("SELECT * FROM t", vec![])).await.unwrap();
   assert_eq!(rows, json!([]));

   db.execute(write(
      "INSERT INTO t (name, active) VALUES ($1,$2), ($3,$4), ($5,$6)",
      vec![
         json!("Alice"),
         json!(1),
         json!("Bob"),
         json!(0),
         json!("Charlie"),
         json!(1),
      ],
   ))
   .await
   .unwrap();

   let rows = db
      .execute(read("SELECT * FROM t ORDER BY id", vec![]))
      .await
      .unwrap();

   assert_eq!(rows.as_array().unwrap().len(), 3);
   assert_eq!(rows[0]["name"], json!("Alice"));

   // Parameter filter, through a different read operation name
   let count = db
      .execute(
         Statement::new("SELECT count(*) AS n FROM t WHERE active = $1", vec![json!(1)])
            .into_operation("count"),
      )
      .await
      .unwrap();

   assert_eq!(count, json!([{ "n": 2 }]));

   db.close().await;
}

#[tokio::test]
async fn test_type_binding_and_decoding() {
   let (db, _temp) = create_test_endpoint();
   db.execute(write(
      "CREATE TABLE t (id INTEGER PRIMARY KEY, txt TEXT, num REAL, big INTEGER, flag BOOLEAN, data BLOB)",
      vec![],
   ))
   .await
   .unwrap();

   let large_int: i64 = 9_007_199_254_740_992; // 2^53

   db.execute(write("INSERT INTO t (txt) VALUES ($1)", vec![JsonValue::Null]))
      .await
      .unwrap();
   db.execute(write(
      "INSERT INTO t (txt, num) VALUES ($1, $2)",
      vec![json!("hello"), json!(1.23456)],
   ))
   .await
   .unwrap();
   db.execute(write("INSERT INTO t (big) VALUES ($1)", vec![json!(large_int)]))
      .await
      .unwrap();
   db.execute(write("INSERT INTO t (flag) VALUES ($1)", vec![json!(true)]))
      .await
      .unwrap();
   // BLOB ("Hello" in hex)
   db.execute(write("INSERT INTO t (data) VALUES (X'48656C6C6F')", vec![]))
      .await
      .unwrap();

   let rows = db
      .execute(read("SELECT * FROM t ORDER BY id", vec![]))
      .await
      .unwrap();

   assert_eq!(rows[0]["txt"], JsonValue::Null);

   let num = rows[1]["num"].as_f64().unwrap();
   assert!((num - 1.23456).abs() < 0.0001);

   assert_eq!(rows[2]["big"], json!(large_int));

   // Boolean stored as integer
   assert_eq!(rows[3]["flag"], json!(1));

   // BLOB as base64
   assert_eq!(rows[4]["data"], json!("SGVsbG8="));

   db.close().await;
}

#[tokio::test]
async fn test_column_order_preserved() {
   let (db, _temp) = create_test_endpoint();
   db.execute(write("CREATE TABLE t (z TEXT, a TEXT, m TEXT)", vec![]))
      .await
      .unwrap();
   db.execute(write(
      "INSERT INTO t VALUES ($1, $2, $3)",
      vec![json!("z"), json!("a"), json!("m")],
   ))
   .await
   .unwrap();

   let rows = db.execute(read("SELECT z, a, m FROM t", vec![])).await.unwrap();

   let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
   assert_eq!(keys, vec!["z", "a", "m"]);

   db.close().await;
}

#[tokio::test]
async fn test_operation_without_statement_fails() {
   let (db, _temp) = create_test_endpoint();

   let err = db
      .execute(Operation::on("user", "findMany", json!({})))
      .await
      .unwrap_err();

   assert!(matches!(err, Error::InvalidStatement { .. }));
}

#[tokio::test]
async fn test_read_only_endpoint_rejects_writes() {
   let temp_dir = TempDir::new().unwrap();
   let url = db_url(&temp_dir, "replica.db");

   let writer = SqliteEndpoint::open(&url, None).unwrap();
   writer
      .execute(write("CREATE TABLE t (id INTEGER PRIMARY KEY)", vec![]))
      .await
      .unwrap();
   writer.close().await;

   let replica = SqliteEndpoint::open(&url, Some(SqliteEndpointConfig::replica())).unwrap();
   assert!(replica.is_read_only());

   let rows = replica.execute(read("SELECT * FROM t", vec![])).await.unwrap();
   assert_eq!(rows, json!([]));

   let err = replica
      .execute(write("INSERT INTO t (id) VALUES (1)", vec![]))
      .await
      .unwrap_err();
   assert!(matches!(err, Error::Sqlx(_)));

   replica.close().await;
}

#[tokio::test]
async fn test_invalid_url() {
   let err = SqliteEndpoint::open("sqlite://test.db?mode=bogus", None).unwrap_err();
   assert_eq!(err.error_code(), "INVALID_URL");
}

#[tokio::test]
async fn test_transaction_commit_and_rollback() {
   let (db, _temp) = create_test_endpoint();
   db.execute(write(
      "CREATE TABLE t (id INTEGER PRIMARY KEY, val INTEGER NOT NULL)",
      vec![],
   ))
   .await
   .unwrap();
   db.execute(write("INSERT INTO t (id, val) VALUES (1, 100)", vec![]))
      .await
      .unwrap();

   // Committed changes are visible
   let tx = db.begin().await.unwrap();
   tx.execute(write("UPDATE t SET val = 70 WHERE id = 1", vec![]))
      .await
      .unwrap();
   let inside = tx
      .execute(read("SELECT val FROM t WHERE id = 1", vec![]))
      .await
      .unwrap();
   assert_eq!(inside, json!([{ "val": 70 }]));
   tx.commit().await.unwrap();

   // Rolled back changes are not
   let tx = db.begin().await.unwrap();
   tx.execute(write("UPDATE t SET val = 999 WHERE id = 1", vec![]))
      .await
      .unwrap();
   tx.rollback().await.unwrap();

   let rows = db
      .execute(read("SELECT val FROM t WHERE id = 1", vec![]))
      .await
      .unwrap();
   assert_eq!(rows, json!([{ "val": 70 }]));

   db.close().await;
}

#[tokio::test]
async fn test_finalized_transaction_rejects_operations() {
   let (db, _temp) = create_test_endpoint();
   db.execute(write("CREATE TABLE t (id INTEGER)", vec![]))
      .await
      .unwrap();

   let tx = db.begin().await.unwrap();
   assert!(!tx.id().is_empty());
   tx.commit().await.unwrap();

   let err = tx
      .execute(read("SELECT * FROM t", vec![]))
      .await
      .unwrap_err();
   assert!(matches!(err, Error::TransactionAlreadyFinalized));

   let err = tx.commit().await.unwrap_err();
   assert_eq!(err.error_code(), "TRANSACTION_ALREADY_FINALIZED");

   db.close().await;
}
