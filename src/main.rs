use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schoolreports::config::{Config, LogFormat, StoreBackend};
use schoolreports::configure_app;
use schoolreports::middleware::{ErrorLogger, RequestId};
use schoolreports::modules::access::AccessDirectory;
use schoolreports::modules::reports::repositories::{
    InMemoryReportRepository, MySqlReportRepository, ReportRepository,
};
use schoolreports::modules::reports::services::{ReportService, ReportServiceSettings};

/// `RUST_LOG` wins over `LOG_LEVEL`
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("schoolreports={},actix_web=info", log_level).into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn build_repository(config: &Config) -> anyhow::Result<Arc<dyn ReportRepository>> {
    match (config.store, &config.database) {
        (StoreBackend::Mysql, Some(database)) => {
            let pool = database
                .create_pool()
                .await
                .context("Failed to create database pool")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            tracing::info!(
                min = database.pool_size,
                max = database.max_connections,
                "Database pool initialized"
            );
            Ok(Arc::new(MySqlReportRepository::new(pool)))
        }
        (StoreBackend::Mysql, None) => anyhow::bail!("DATABASE_URL is required for the mysql store"),
        (StoreBackend::Memory, _) => {
            tracing::warn!("Using in-memory report store; data is lost on restart");
            Ok(Arc::new(InMemoryReportRepository::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    init_tracing(&config.app.log_level, config.app.log_format);

    tracing::info!("Starting school reports service");
    tracing::info!(env = %config.app.env, store = ?config.store, "Configuration loaded");

    let directory = Arc::new(
        AccessDirectory::load(&config.access.directory_path).with_context(|| {
            format!(
                "Failed to load access directory from {}",
                config.access.directory_path.display()
            )
        })?,
    );
    tracing::info!(users = directory.len(), "Access directory loaded");

    let repository = build_repository(&config).await?;

    let service = Arc::new(ReportService::new(
        repository,
        directory.clone(),
        directory,
        ReportServiceSettings {
            permission_timeout: config.access.permission_timeout(),
            max_page_size: config.reports.max_page_size,
        },
    ));

    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(service.clone()))
            .wrap(ErrorLogger)
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .configure(configure_app)
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!(workers = config.server.workers, "Server started at http://{}", bind_address);

    server.await.context("Server error")
}
