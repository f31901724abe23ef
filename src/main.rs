//! Statx server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_web::{App, HttpServer, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use statx_lib::api::{self, ApiDoc};
use statx_lib::config::Config;
use statx_lib::db::DbPool;
use statx_lib::middleware::RequestLogger;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, STATX_DATABASE_URL must point to a persistent database file");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Statx Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development default for STATX_DATABASE_URL");
    }

    let pool = match DbPool::shared(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!(url = %config.database.url, "Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let bind_address = config.bind_address();
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    if is_development {
        info!("Swagger UI available at http://{}/swagger-ui/", bind_address);
    }

    let app_pool = pool.clone();
    let server = HttpServer::new(move || {
        let mut app = App::new()
            .wrap(RequestLogger)
            .app_data(web::Data::new(app_pool.clone()))
            .service(
                web::scope("/api_v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_test_results_routes),
            );

        if is_development {
            app = app.service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            );
        }

        app
    });

    let result = server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await;

    info!("Server stopped, closing database");
    if let Err(e) = pool.close().await {
        warn!("Failed to close database cleanly: {}", e);
    }

    result
}
