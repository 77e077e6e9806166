use async_trait::async_trait;

use crate::core::{AppError, Page, ReportCoordinate, ReportPeriod, Result};
use crate::modules::reports::models::{
    DailyFinancialReport, DailyFinancialReportEntry, MonthlyReport, ReportStatus,
};

/// A requested status move and the user asking for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub target: ReportStatus,
    pub actor_id: String,
}

impl StatusChange {
    pub fn new(target: ReportStatus, actor_id: impl Into<String>) -> Self {
        Self {
            target,
            actor_id: actor_id.into(),
        }
    }

    /// The actor counts as reviewer only for a review
    pub fn reviewer(&self) -> Option<&str> {
        (self.target == ReportStatus::Reviewed).then_some(self.actor_id.as_str())
    }
}

/// Transactional store for the monthly -> daily -> entry report graph
///
/// Every write is a single unit: either all of its effects are visible or none are.
/// Calls addressed by a `ReportCoordinate` only see the report if it belongs to the
/// coordinate's school; the ownership check runs under the same lock or
/// transaction as the read or write it guards. A report held by another school is
/// indistinguishable from a missing one.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a monthly report together with its (empty, draft) daily financial report.
    /// Fails with `Conflict` if any report already holds the period.
    async fn create_monthly_report(&self, report: &MonthlyReport) -> Result<MonthlyReport>;

    async fn find_monthly_report(
        &self,
        coordinate: ReportCoordinate,
    ) -> Result<Option<MonthlyReport>>;

    /// Page of reports in insertion order, optionally restricted to one school
    async fn list_monthly_reports(
        &self,
        school_id: Option<i64>,
        page: Page,
    ) -> Result<Vec<MonthlyReport>>;

    /// Remove the monthly report, its daily financial report and every entry.
    /// Fails with `NotFound` if the coordinate holds no report.
    async fn delete_monthly_report(&self, coordinate: ReportCoordinate) -> Result<()>;

    /// Daily financial report with entries ordered by day
    async fn find_daily_financial_report(
        &self,
        coordinate: ReportCoordinate,
    ) -> Result<Option<DailyFinancialReport>>;

    async fn find_entry(
        &self,
        coordinate: ReportCoordinate,
        day: u32,
    ) -> Result<Option<DailyFinancialReportEntry>>;

    /// Insert or overwrite the entry for (period, day) of a report owned by
    /// `school_id`. Both owning reports must be drafts.
    async fn upsert_entry(
        &self,
        school_id: i64,
        entry: &DailyFinancialReportEntry,
    ) -> Result<DailyFinancialReportEntry>;

    /// Remove one entry. Both owning reports must be drafts.
    async fn delete_entry(&self, coordinate: ReportCoordinate, day: u32) -> Result<()>;

    async fn transition_monthly_report(
        &self,
        coordinate: ReportCoordinate,
        change: &StatusChange,
    ) -> Result<MonthlyReport>;

    async fn transition_daily_financial_report(
        &self,
        coordinate: ReportCoordinate,
        change: &StatusChange,
    ) -> Result<DailyFinancialReport>;

    /// Cheap connectivity probe for readiness checks
    async fn ping(&self) -> Result<()>;
}

pub(crate) fn monthly_not_found(period: ReportPeriod) -> AppError {
    AppError::not_found(format!("Monthly report for {} not found.", period))
}

pub(crate) fn daily_not_found(period: ReportPeriod) -> AppError {
    AppError::not_found(format!(
        "Daily financial report for {} not found.",
        period
    ))
}

pub(crate) fn entry_not_found(period: ReportPeriod, day: u32) -> AppError {
    AppError::not_found(format!("Entry for day {} of {} not found.", day, period))
}

pub(crate) fn period_conflict(period: ReportPeriod) -> AppError {
    AppError::conflict(format!(
        "Monthly report for {} already exists.",
        period
    ))
}
