//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Statx Server",
        version = "0.1.0",
        description = "API server for recording device test results and serving pass/fail statistics per device type"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Test results endpoints
        api::test_results::get_stats,
        api::test_results::add_test_result,
        api::test_results::get_test_result,
        api::test_results::delete_test_result,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Test Results
            models::AggregationRow,
            api::test_results::StatQuery,
            api::test_results::AddTestResultForm,
            api::test_results::TestResultCreatedResponse,
            api::test_results::TestResultResponse,
            api::test_results::TestResultDeletedResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Test Results", description = "Record test results and query statistics")
    )
)]
pub struct ApiDoc;
