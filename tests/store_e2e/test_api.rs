//! HTTP endpoints under /api_v1.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};
use statx_lib::config::DatabaseSettings;
use statx_lib::db::DbPool;

use super::test_helpers::{create_test_app, create_test_pool, seed};

fn form_request(body: &str) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/api_v1/test_result")
        .insert_header(("content-type", "application/x-www-form-urlencoded"))
        .set_payload(body.to_string())
        .to_request()
}

#[actix_rt::test]
async fn test_add_then_stat() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let resp = test::call_service(
        &app,
        form_request("dev_type=Phone&operator=Bob&dt=2020-02-20T10%3A00%3A00&success=1"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["id"].as_i64().unwrap() >= 1);

    let req = test::TestRequest::get().uri("/api_v1/stat").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!([{"dev_type": "Phone", "count": 1, "successful": 1, "failed": 0}])
    );
}

#[actix_rt::test]
async fn test_stat_filters_by_operator() {
    let pool = create_test_pool().await;
    seed(&pool, "Phone", "Bob", true).await;
    seed(&pool, "Tablet", "Eve", false).await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get()
        .uri("/api_v1/stat?operator=Eve")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!([{"dev_type": "Tablet", "count": 1, "successful": 0, "failed": 1}])
    );

    let req = test::TestRequest::get()
        .uri("/api_v1/stat?operator=")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_add_rejects_invalid_field() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let resp = test::call_service(
        &app,
        form_request("dev_type=Phone&operator=Bob&dt=yesterday&success=1"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_INPUT");
    assert!(body["message"].as_str().unwrap().contains("'dt'"));

    let resp = test::call_service(
        &app,
        form_request("dev_type=Phone&operator=Bob&dt=2020-02-20"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("'success'"));

    let req = test::TestRequest::get().uri("/api_v1/stat").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_rt::test]
async fn test_get_and_delete_test_result() {
    let pool = create_test_pool().await;
    let id = seed(&pool, "Phone", "Bob", true).await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api_v1/test_result/{}", id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["dev_type"], "Phone");
    assert_eq!(body["dt"], "2020-02-20 10:00:00");
    assert_eq!(body["success"], true);

    let req = test::TestRequest::delete()
        .uri(&format!("/api_v1/test_result/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"id": id, "removed": 1}));

    let req = test::TestRequest::delete()
        .uri(&format!("/api_v1/test_result/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_FOUND");
    assert_eq!(body["message"], format!("Test result {} not found", id));

    let req = test::TestRequest::get()
        .uri(&format!("/api_v1/test_result/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_health_and_ready() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get().uri("/api_v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");

    let req = test::TestRequest::get().uri("/api_v1/ready").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["database"], "connected");
    assert_eq!(body["schema"], "migrated");
}

#[actix_rt::test]
async fn test_not_ready_before_migrations() {
    let pool = DbPool::connect(&DatabaseSettings::new("sqlite::memory:"))
        .await
        .unwrap();
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get().uri("/api_v1/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_READY");

    pool.run_migrations().await.unwrap();
    let req = test::TestRequest::get().uri("/api_v1/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_undecodable_form_gets_json_error() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api_v1/test_result")
        .set_json(json!({"dev_type": "Phone"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_INPUT");
    assert!(body["message"].as_str().unwrap().starts_with("Invalid input:"));
}

#[actix_rt::test]
async fn test_non_numeric_id_gets_json_not_found() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    for req in [
        test::TestRequest::delete().uri("/api_v1/test_result/abc"),
        test::TestRequest::get().uri("/api_v1/test_result/abc"),
    ] {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Test result abc not found");
    }
}
