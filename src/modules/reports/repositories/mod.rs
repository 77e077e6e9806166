pub mod in_memory_report_repository;
pub mod mysql_report_repository;
pub mod report_repository;

pub use in_memory_report_repository::InMemoryReportRepository;
pub use mysql_report_repository::MySqlReportRepository;
pub use report_repository::{ReportRepository, StatusChange};
