//! Pass/fail statistics over stored results.

use statx_lib::db::stats::StatFilter;
use statx_lib::models::AggregationRow;

use super::test_helpers::{create_test_pool, seed};

fn row(dev_type: &str, successful: i64, failed: i64) -> AggregationRow {
    AggregationRow {
        dev_type: dev_type.to_string(),
        count: successful + failed,
        successful,
        failed,
    }
}

#[actix_rt::test]
async fn test_empty_store_has_no_rows() {
    let pool = create_test_pool().await;

    let rows = pool.aggregate_test_results(&StatFilter::all()).await.unwrap();
    assert!(rows.is_empty());
}

#[actix_rt::test]
async fn test_groups_by_device_type_sorted() {
    let pool = create_test_pool().await;
    seed(&pool, "Phone", "Bob", true).await;
    seed(&pool, "Phone", "Bob", false).await;
    seed(&pool, "Phone", "Eve", true).await;
    seed(&pool, "Laptop", "Eve", false).await;

    let rows = pool.aggregate_test_results(&StatFilter::all()).await.unwrap();
    assert_eq!(rows, vec![row("Laptop", 0, 1), row("Phone", 2, 1)]);

    for r in &rows {
        assert_eq!(r.count, r.successful + r.failed);
    }
}

#[actix_rt::test]
async fn test_operator_filter() {
    let pool = create_test_pool().await;
    seed(&pool, "Phone", "Bob", true).await;
    seed(&pool, "Phone", "Eve", false).await;
    seed(&pool, "Tablet", "Eve", true).await;

    let rows = pool
        .aggregate_test_results(&StatFilter::for_operator(Some("Eve")))
        .await
        .unwrap();
    assert_eq!(rows, vec![row("Phone", 0, 1), row("Tablet", 1, 0)]);

    let rows = pool
        .aggregate_test_results(&StatFilter::for_operator(Some("Nobody")))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[actix_rt::test]
async fn test_empty_operator_means_all() {
    let pool = create_test_pool().await;
    seed(&pool, "Phone", "Bob", true).await;
    seed(&pool, "Phone", "Eve", true).await;

    let rows = pool
        .aggregate_test_results(&StatFilter::for_operator(Some("")))
        .await
        .unwrap();
    assert_eq!(rows, vec![row("Phone", 2, 0)]);
}

#[actix_rt::test]
async fn test_operator_value_is_not_interpolated() {
    let pool = create_test_pool().await;
    seed(&pool, "Phone", "Bob", true).await;

    let rows = pool
        .aggregate_test_results(&StatFilter::for_operator(Some("x' OR '1'='1")))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[actix_rt::test]
async fn test_deleted_records_leave_the_statistics() {
    let pool = create_test_pool().await;
    let id = seed(&pool, "Phone", "Bob", false).await;
    seed(&pool, "Phone", "Bob", true).await;

    pool.delete_test_result(id).await.unwrap();

    let rows = pool.aggregate_test_results(&StatFilter::all()).await.unwrap();
    assert_eq!(rows, vec![row("Phone", 1, 0)]);
}
