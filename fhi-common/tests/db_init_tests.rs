//! Database creation and table setup

use fhi_common::db::{create_local_cache_table, create_records_table, open_database};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_created_with_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("a").join("b").join("fhi.db");

    let pool = open_database(&db_path).await.unwrap();
    create_records_table(&pool).await.unwrap();
    create_local_cache_table(&pool).await.unwrap();

    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_table_creation_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("fhi.db");

    let pool = open_database(&db_path).await.unwrap();
    create_records_table(&pool).await.unwrap();
    create_records_table(&pool).await.unwrap();

    sqlx::query("INSERT INTO records (id, created_at, data) VALUES ('a', 'b', '{}')")
        .execute(&pool)
        .await
        .unwrap();
    drop(pool);

    // Reopen: existing rows survive
    let pool = open_database(&db_path).await.unwrap();
    create_records_table(&pool).await.unwrap();
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM records")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
