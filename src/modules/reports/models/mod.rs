mod daily_financial_report;
mod monthly_report;
mod report_status;

pub use daily_financial_report::{
    DailyEntryData, DailyFinancialReport, DailyFinancialReportEntry, MAX_AMOUNT_SCALE, MAX_DAY,
    MIN_DAY,
};
pub use monthly_report::MonthlyReport;
pub use report_status::ReportStatus;
