pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{DailyFinancialReport, DailyFinancialReportEntry, MonthlyReport, ReportStatus};
pub use repositories::{InMemoryReportRepository, MySqlReportRepository, ReportRepository};
pub use services::{ReportService, ReportServiceSettings};
