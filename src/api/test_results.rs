//! Test results API handlers: statistics, recording and removal.

use actix_web::error::{PathError, QueryPayloadError, UrlencodedError};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::db::stats::StatFilter;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{AggregationRow, NewTestResult};
use crate::validation::Field;

/// Query parameters for the statistics endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatQuery {
    /// Only count results entered by this operator. Empty means all.
    pub operator: Option<String>,
}

/// Form body for recording a test result.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddTestResultForm {
    /// Device type under test.
    pub dev_type: Option<String>,
    /// Person or process that ran the test.
    pub operator: Option<String>,
    /// ISO-8601 date-time of the run.
    pub dt: Option<String>,
    /// `1` if the device passed, `0` otherwise.
    pub success: Option<String>,
}

impl AddTestResultForm {
    fn field(&self, field: Field) -> Result<&str, ValidationError> {
        let value = match field {
            Field::DevType => &self.dev_type,
            Field::Operator => &self.operator,
            Field::Dt => &self.dt,
            Field::Success => &self.success,
        };
        value
            .as_deref()
            .ok_or_else(|| ValidationError::new(field, "field is required"))
    }

    /// Validate the submitted fields in canonical order.
    pub fn validate(&self) -> Result<NewTestResult, ValidationError> {
        let mut raw: [&str; 4] = [""; 4];
        for (slot, field) in raw.iter_mut().zip(Field::ALL) {
            *slot = self.field(field)?;
        }
        NewTestResult::from_raw(raw)
    }
}

/// Response for a newly recorded test result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TestResultCreatedResponse {
    pub id: i64,
}

/// Stored test result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TestResultResponse {
    pub id: i64,
    pub dev_type: String,
    pub operator: String,
    /// Timestamp in canonical form (`YYYY-MM-DD HH:MM:SS`).
    pub dt: String,
    pub success: bool,
}

/// Response for a removed test result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TestResultDeletedResponse {
    pub id: i64,
    /// Number of removed records (always 1 on success).
    pub removed: u64,
}

/// Pass/fail statistics per device type.
#[utoipa::path(
    get,
    path = "/api_v1/stat",
    tag = "Test Results",
    params(
        ("operator" = Option<String>, Query, description = "Filter by operator")
    ),
    responses(
        (status = 200, description = "Counts per device type, sorted by device type", body = [AggregationRow]),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_stats(
    pool: web::Data<DbPool>,
    query: web::Query<StatQuery>,
) -> AppResult<HttpResponse> {
    let filter = StatFilter::for_operator(query.operator.as_deref());
    let rows = pool.aggregate_test_results(&filter).await?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Record a test result.
#[utoipa::path(
    post,
    path = "/api_v1/test_result",
    tag = "Test Results",
    request_body(content = AddTestResultForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Test result recorded", body = TestResultCreatedResponse),
        (status = 400, description = "A field failed validation", body = crate::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse),
    )
)]
pub async fn add_test_result(
    pool: web::Data<DbPool>,
    form: web::Form<AddTestResultForm>,
) -> AppResult<HttpResponse> {
    let record = form.validate()?;
    let id = pool.insert_test_result(record).await?;

    info!(id, "Test result recorded");

    Ok(HttpResponse::Ok().json(TestResultCreatedResponse { id }))
}

/// Get a stored test result.
#[utoipa::path(
    get,
    path = "/api_v1/test_result/{id}",
    tag = "Test Results",
    params(
        ("id" = i64, Path, description = "Test result ID")
    ),
    responses(
        (status = 200, description = "Test result", body = TestResultResponse),
        (status = 404, description = "No test result with this ID", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_test_result(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let model = pool
        .get_test_result_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test result {}", id)))?;

    Ok(HttpResponse::Ok().json(TestResultResponse {
        id: model.id,
        dev_type: model.dev_type,
        operator: model.operator,
        dt: model.dt,
        success: model.success,
    }))
}

/// Remove a test result.
#[utoipa::path(
    delete,
    path = "/api_v1/test_result/{id}",
    tag = "Test Results",
    params(
        ("id" = i64, Path, description = "Test result ID")
    ),
    responses(
        (status = 200, description = "Test result removed", body = TestResultDeletedResponse),
        (status = 404, description = "No test result with this ID", body = crate::error::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_test_result(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let removed = pool.delete_test_result(id).await?;
    if removed == 0 {
        return Err(AppError::NotFound(format!("Test result {}", id)));
    }

    info!(id, "Test result removed");

    Ok(HttpResponse::Ok().json(TestResultDeletedResponse { id, removed }))
}

fn form_error(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidInput(format!("Form body could not be read: {}", err)).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidInput(format!("Query string could not be read: {}", err)).into()
}

/// A non-numeric id can never name a stored result.
fn path_error(_err: PathError, req: &HttpRequest) -> actix_web::Error {
    let id = req.match_info().get("id").unwrap_or_default();
    AppError::NotFound(format!("Test result {}", id)).into()
}

/// Configure test results routes.
///
/// Extractor failures are answered with the same JSON error body as
/// handler errors.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(form_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error));

    cfg.service(web::resource("/stat").route(web::get().to(get_stats)))
        .service(web::resource("/test_result").route(web::post().to(add_test_result)))
        .service(
            web::resource("/test_result/{id}")
                .route(web::get().to(get_test_result))
                .route(web::delete().to(delete_test_result)),
        );
}
