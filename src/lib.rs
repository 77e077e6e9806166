//! School financial reports service
//!
//! Monthly reports owned by a school, each carrying one daily financial report
//! with per-day sales and purchases entries, moved through a
//! draft / submitted / reviewed workflow under scoped permissions.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

use actix_web::{error::JsonPayloadError, error::PathError, error::QueryPayloadError, web};

pub use crate::core::{AppError, Result};
pub use modules::access;
pub use modules::reports;

/// Register every route and the extractor error handlers.
/// The caller supplies `web::Data<Arc<ReportService>>`.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req| {
        AppError::invalid_argument(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err: PathError, _req| {
        AppError::invalid_argument(format!("Invalid path: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req| {
        AppError::invalid_argument(format!("Invalid query: {}", err)).into()
    }))
    .configure(modules::health::configure)
    .configure(modules::reports::controllers::configure);
}
