//! Schema migration tests.
//!
//! Each test gets a fresh database from `#[sqlx::test]`; the embedded
//! migrations are applied by the code under test, not by the harness.
//! Requires `DATABASE_URL` pointing at a PostgreSQL server.

#![allow(clippy::unwrap_used)]

use longing_core::{ORDER_NUMBER_SEQUENCE, OrderNumber};
use longing_server::db::migrations::{
    self, BASELINE_VERSION, MigrationStatus, ORDER_NUMBER_VERSION,
};
use sqlx::PgPool;

async fn sequence_exists(pool: &PgPool) -> bool {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM pg_class WHERE relkind = 'S' AND relname = $1)",
    )
    .bind(ORDER_NUMBER_SEQUENCE)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// `(is_nullable, column_default)` of `orders.number`, if the column exists.
async fn number_column(pool: &PgPool) -> Option<(String, Option<String>)> {
    sqlx::query_as::<_, (String, Option<String>)>(
        r"
        SELECT is_nullable::text, column_default::text
        FROM information_schema.columns
        WHERE table_schema = current_schema()
          AND table_name = 'orders'
          AND column_name = 'number'
        ",
    )
    .fetch_optional(pool)
    .await
    .unwrap()
}

async fn insert_order(pool: &PgPool) -> i32 {
    sqlx::query_scalar::<_, i32>("INSERT INTO orders DEFAULT VALUES RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn order_numbers(pool: &PgPool) -> Vec<i32> {
    sqlx::query_scalar::<_, i32>("SELECT number FROM orders ORDER BY number")
        .fetch_all(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_upgrade_adds_required_numbered_column(pool: PgPool) {
    migrations::upgrade(&pool).await.unwrap();

    assert!(sequence_exists(&pool).await);
    let (nullable, default) = number_column(&pool).await.unwrap();
    assert_eq!(nullable, "NO");
    assert!(
        default
            .unwrap()
            .starts_with(&format!("nextval('{ORDER_NUMBER_SEQUENCE}'"))
    );
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_upgrade_twice_is_noop(pool: PgPool) {
    migrations::upgrade(&pool).await.unwrap();
    insert_order(&pool).await;

    migrations::upgrade(&pool).await.unwrap();

    assert_eq!(order_numbers(&pool).await, vec![1]);
    assert!(
        migrations::status(&pool)
            .await
            .unwrap()
            .iter()
            .all(|m| m.applied)
    );
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_new_orders_get_increasing_numbers(pool: PgPool) {
    migrations::upgrade(&pool).await.unwrap();

    let mut numbers = Vec::new();
    for _ in 0..5 {
        let id = insert_order(&pool).await;
        let number: OrderNumber = sqlx::query_scalar("SELECT number FROM orders WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        numbers.push(number);
    }

    assert_eq!(numbers.first(), Some(&OrderNumber::FIRST));
    assert!(numbers.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(numbers.last().copied(), Some(OrderNumber::new(5)));
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_upgrade_backfills_existing_orders(pool: PgPool) {
    migrations::upgrade(&pool).await.unwrap();
    migrations::downgrade_order_number(&pool).await.unwrap();
    for _ in 0..3 {
        insert_order(&pool).await;
    }

    migrations::upgrade(&pool).await.unwrap();

    // Existing rows draw distinct values from the fresh sequence.
    assert_eq!(order_numbers(&pool).await, vec![1, 2, 3]);
    insert_order(&pool).await;
    assert_eq!(order_numbers(&pool).await, vec![1, 2, 3, 4]);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_upgrade_reuses_existing_sequence(pool: PgPool) {
    migrations::upgrade(&pool).await.unwrap();
    migrations::downgrade_order_number(&pool).await.unwrap();
    sqlx::query(&format!("CREATE SEQUENCE {ORDER_NUMBER_SEQUENCE} START WITH 100"))
        .execute(&pool)
        .await
        .unwrap();

    migrations::upgrade(&pool).await.unwrap();
    insert_order(&pool).await;

    assert_eq!(order_numbers(&pool).await, vec![100]);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_downgrade_removes_column_then_sequence(pool: PgPool) {
    migrations::upgrade(&pool).await.unwrap();
    insert_order(&pool).await;

    migrations::downgrade_order_number(&pool).await.unwrap();

    assert!(number_column(&pool).await.is_none());
    assert!(!sequence_exists(&pool).await);
    // Baseline tables and rows are untouched.
    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orders, 1);
    assert_eq!(
        migrations::status(&pool).await.unwrap(),
        vec![
            MigrationStatus {
                version: BASELINE_VERSION,
                description: "baseline".to_string(),
                applied: true,
            },
            MigrationStatus {
                version: ORDER_NUMBER_VERSION,
                description: "add order number".to_string(),
                applied: false,
            },
        ]
    );
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_downgrade_tolerates_missing_sequence(pool: PgPool) {
    migrations::upgrade(&pool).await.unwrap();
    sqlx::query("ALTER TABLE orders ALTER COLUMN number DROP DEFAULT")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(&format!("DROP SEQUENCE {ORDER_NUMBER_SEQUENCE}"))
        .execute(&pool)
        .await
        .unwrap();

    migrations::downgrade_order_number(&pool).await.unwrap();

    assert!(number_column(&pool).await.is_none());
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL pointing at PostgreSQL"]
async fn test_downgrade_then_upgrade_round_trip(pool: PgPool) {
    migrations::upgrade(&pool).await.unwrap();
    migrations::downgrade_order_number(&pool).await.unwrap();
    migrations::upgrade(&pool).await.unwrap();

    assert!(sequence_exists(&pool).await);
    assert!(number_column(&pool).await.is_some());
    assert_eq!(
        migrations::previous_version(&pool).await.unwrap(),
        Some(BASELINE_VERSION)
    );
}
