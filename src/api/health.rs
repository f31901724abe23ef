//! Liveness and readiness checks.

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::error::ErrorResponse;

/// Liveness response.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
}

/// Readiness response.
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    status: &'static str,
    database: &'static str,
    schema: &'static str,
}

fn not_ready(message: &str) -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ErrorResponse {
        error: "NOT_READY".to_string(),
        message: message.to_string(),
    })
}

/// The process is up.
#[utoipa::path(
    get,
    path = "/api_v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// The store can take results: the database answers and the test results
/// table has been created.
#[utoipa::path(
    get,
    path = "/api_v1/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Store is ready", body = ReadyResponse),
        (status = 503, description = "Database unreachable or not initialized", body = ErrorResponse)
    )
)]
#[get("/ready")]
pub async fn ready(pool: web::Data<DbPool>) -> HttpResponse {
    match pool.has_schema().await {
        Ok(true) => HttpResponse::Ok().json(ReadyResponse {
            status: "ready",
            database: "connected",
            schema: "migrated",
        }),
        Ok(false) => not_ready("Database is not initialized: test_results table is missing"),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            not_ready("Database connection failed")
        }
    }
}

/// Configure health routes.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}
