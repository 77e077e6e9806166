use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::core::pagination::MAX_LIMIT;
use crate::core::{AppError, Page, ReportCoordinate, Result};
use crate::modules::access::{Actor, ActorResolver, PermissionChecker};
use crate::modules::reports::models::{
    DailyFinancialReport, DailyFinancialReportEntry, MonthlyReport, ReportStatus,
};
use crate::modules::reports::repositories::report_repository::{entry_not_found, monthly_not_found};
use crate::modules::reports::repositories::{ReportRepository, StatusChange};
use crate::modules::reports::services::scope_resolver::{PermissionScope, ReportAction};

/// Tunables for the report service
#[derive(Debug, Clone, Copy)]
pub struct ReportServiceSettings {
    /// Upper bound on a permission decision; exceeding it denies the request
    pub permission_timeout: Duration,
    /// Largest page a list call may return
    pub max_page_size: i64,
}

impl Default for ReportServiceSettings {
    fn default() -> Self {
        Self {
            permission_timeout: Duration::from_secs(2),
            max_page_size: MAX_LIMIT,
        }
    }
}

/// Orchestrates report operations
///
/// Every operation resolves the actor, derives the scoped permission from the
/// actor's school and the target school, asks the permission checker, and only
/// then touches the repository.
pub struct ReportService {
    repo: Arc<dyn ReportRepository>,
    actors: Arc<dyn ActorResolver>,
    permissions: Arc<dyn PermissionChecker>,
    settings: ReportServiceSettings,
}

impl ReportService {
    pub fn new(
        repo: Arc<dyn ReportRepository>,
        actors: Arc<dyn ActorResolver>,
        permissions: Arc<dyn PermissionChecker>,
        settings: ReportServiceSettings,
    ) -> Self {
        Self {
            repo,
            actors,
            permissions,
            settings,
        }
    }

    /// Resolve the actor and check `action` against `target_school_id`.
    /// `None` targets every school and therefore always needs the global grant.
    async fn authorize(
        &self,
        token: &str,
        target_school_id: Option<i64>,
        action: ReportAction,
    ) -> Result<Actor> {
        let actor = self.actors.resolve_actor(token).await?;
        self.check_permission(&actor, target_school_id, action).await?;
        Ok(actor)
    }

    async fn check_permission(
        &self,
        actor: &Actor,
        target_school_id: Option<i64>,
        action: ReportAction,
    ) -> Result<()> {
        let scope = match target_school_id {
            Some(school_id) => PermissionScope::resolve(actor.school_id, school_id),
            None => PermissionScope::Global,
        };
        let permission = scope.permission(action);

        let decision = tokio::time::timeout(
            self.settings.permission_timeout,
            self.permissions.is_allowed(&actor.id, &permission),
        )
        .await;

        let allowed = match decision {
            Ok(Ok(allowed)) => allowed,
            Ok(Err(e)) => {
                warn!(actor = %actor.id, %permission, error = %e, "Permission check failed, denying");
                false
            }
            Err(_) => {
                warn!(actor = %actor.id, %permission, "Permission check timed out, denying");
                false
            }
        };

        if !allowed {
            return Err(AppError::forbidden(format!(
                "You do not have permission to {} reports.",
                match action {
                    ReportAction::Read => "view",
                    ReportAction::Write => "modify",
                    ReportAction::Review => "review",
                    ReportAction::Delete => "delete",
                }
            )));
        }

        Ok(())
    }

    /// Resolve the actor before looking at the requested status, so a bad
    /// token is reported as such whatever the target
    async fn authorize_transition(
        &self,
        token: &str,
        school_id: i64,
        target: ReportStatus,
    ) -> Result<Actor> {
        let actor = self.actors.resolve_actor(token).await?;
        let action = Self::action_for(target)?;
        self.check_permission(&actor, Some(school_id), action).await?;
        Ok(actor)
    }

    /// List monthly reports, across all schools or for one school
    pub async fn list_monthly_reports(
        &self,
        token: &str,
        school_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<MonthlyReport>> {
        let actor = self.authorize(token, school_id, ReportAction::Read).await?;
        let page = Page::new(offset, limit, self.settings.max_page_size)?;

        debug!(
            actor = %actor.id,
            school_id = ?school_id,
            offset = page.offset,
            limit = page.limit,
            "Listing monthly reports"
        );

        self.repo.list_monthly_reports(school_id, page).await
    }

    /// A report held by another school is reported as absent for this school
    pub async fn get_monthly_report(
        &self,
        token: &str,
        school_id: i64,
        year: i32,
        month: u32,
    ) -> Result<MonthlyReport> {
        let actor = self.authorize(token, Some(school_id), ReportAction::Read).await?;
        let coordinate = ReportCoordinate::new(school_id, year, month)?;

        debug!(actor = %actor.id, school_id, period = %coordinate.period, "Fetching monthly report");

        self.repo
            .find_monthly_report(coordinate)
            .await?
            .ok_or_else(|| monthly_not_found(coordinate.period))
    }

    /// Create the report for (year, month). The month must not be claimed by any school.
    pub async fn create_monthly_report(
        &self,
        token: &str,
        school_id: i64,
        year: i32,
        month: u32,
        name: Option<String>,
    ) -> Result<MonthlyReport> {
        let actor = self.authorize(token, Some(school_id), ReportAction::Write).await?;
        let coordinate = ReportCoordinate::new(school_id, year, month)?;

        debug!(
            actor = %actor.id,
            school_id,
            period = %coordinate.period,
            "Creating monthly report"
        );

        let report = MonthlyReport::new(coordinate.period, school_id, name, actor.id, Utc::now());
        let created = self.repo.create_monthly_report(&report).await.map_err(|e| {
            if matches!(e, AppError::Conflict(_)) {
                debug!(period = %coordinate.period, "Monthly report already exists");
            }
            e
        })?;

        info!(school_id, period = %created.period, "Monthly report created");
        Ok(created)
    }

    /// Delete the report and everything it owns
    pub async fn delete_monthly_report(
        &self,
        token: &str,
        school_id: i64,
        year: i32,
        month: u32,
    ) -> Result<()> {
        let actor = self.authorize(token, Some(school_id), ReportAction::Delete).await?;
        let coordinate = ReportCoordinate::new(school_id, year, month)?;

        self.repo.delete_monthly_report(coordinate).await?;

        info!(actor = %actor.id, school_id, period = %coordinate.period, "Monthly report deleted");
        Ok(())
    }

    /// Move the monthly report one step forward
    pub async fn transition_monthly_report(
        &self,
        token: &str,
        school_id: i64,
        year: i32,
        month: u32,
        target: ReportStatus,
    ) -> Result<MonthlyReport> {
        let actor = self.authorize_transition(token, school_id, target).await?;
        let coordinate = ReportCoordinate::new(school_id, year, month)?;

        debug!(actor = %actor.id, period = %coordinate.period, %target, "Transitioning monthly report");

        self.repo
            .transition_monthly_report(coordinate, &StatusChange::new(target, actor.id))
            .await
    }

    pub async fn get_daily_financial_report(
        &self,
        token: &str,
        school_id: i64,
        year: i32,
        month: u32,
    ) -> Result<DailyFinancialReport> {
        let actor = self.authorize(token, Some(school_id), ReportAction::Read).await?;
        let coordinate = ReportCoordinate::new(school_id, year, month)?;

        debug!(actor = %actor.id, period = %coordinate.period, "Fetching daily financial report");

        // The daily report exists exactly as long as its monthly report
        self.repo
            .find_daily_financial_report(coordinate)
            .await?
            .ok_or_else(|| monthly_not_found(coordinate.period))
    }

    /// Move the daily financial report one step forward
    pub async fn transition_daily_financial_report(
        &self,
        token: &str,
        school_id: i64,
        year: i32,
        month: u32,
        target: ReportStatus,
    ) -> Result<DailyFinancialReport> {
        let actor = self.authorize_transition(token, school_id, target).await?;
        let coordinate = ReportCoordinate::new(school_id, year, month)?;

        debug!(
            actor = %actor.id,
            period = %coordinate.period,
            %target,
            "Transitioning daily financial report"
        );

        self.repo
            .transition_daily_financial_report(coordinate, &StatusChange::new(target, actor.id))
            .await
    }

    pub async fn get_entry(
        &self,
        token: &str,
        school_id: i64,
        year: i32,
        month: u32,
        day: u32,
    ) -> Result<DailyFinancialReportEntry> {
        self.authorize(token, Some(school_id), ReportAction::Read).await?;
        let coordinate = ReportCoordinate::new(school_id, year, month)?;
        Self::check_day(coordinate, day)?;

        if let Some(entry) = self.repo.find_entry(coordinate, day).await? {
            return Ok(entry);
        }

        // Tell a missing report apart from a missing day
        match self.repo.find_monthly_report(coordinate).await? {
            Some(_) => Err(entry_not_found(coordinate.period, day)),
            None => Err(monthly_not_found(coordinate.period)),
        }
    }

    /// Record sales and purchases for a day, replacing any previous values
    pub async fn upsert_entry(
        &self,
        token: &str,
        school_id: i64,
        year: i32,
        month: u32,
        day: u32,
        sales: Decimal,
        purchases: Decimal,
    ) -> Result<DailyFinancialReportEntry> {
        let actor = self.authorize(token, Some(school_id), ReportAction::Write).await?;
        let coordinate = ReportCoordinate::new(school_id, year, month)?;
        Self::check_day(coordinate, day)?;
        let entry = DailyFinancialReportEntry::new(coordinate.period, day, sales, purchases)?;

        debug!(actor = %actor.id, period = %coordinate.period, day, "Upserting daily entry");

        self.repo.upsert_entry(school_id, &entry).await
    }

    pub async fn delete_entry(
        &self,
        token: &str,
        school_id: i64,
        year: i32,
        month: u32,
        day: u32,
    ) -> Result<()> {
        let actor = self.authorize(token, Some(school_id), ReportAction::Write).await?;
        let coordinate = ReportCoordinate::new(school_id, year, month)?;
        Self::check_day(coordinate, day)?;

        debug!(actor = %actor.id, period = %coordinate.period, day, "Deleting daily entry");

        self.repo.delete_entry(coordinate, day).await
    }

    /// Store connectivity for readiness probes
    pub async fn check_store(&self) -> Result<()> {
        self.repo.ping().await
    }

    /// Day must be within 1..=31 and exist in the report's month
    fn check_day(coordinate: ReportCoordinate, day: u32) -> Result<()> {
        DailyFinancialReportEntry::validate_day(day)?;
        if !coordinate.period.contains_day(day) {
            return Err(AppError::invalid_argument(format!(
                "{} has no day {}",
                coordinate.period, day
            )));
        }
        Ok(())
    }

    fn action_for(target: ReportStatus) -> Result<ReportAction> {
        match target {
            ReportStatus::Submitted => Ok(ReportAction::Write),
            ReportStatus::Reviewed => Ok(ReportAction::Review),
            ReportStatus::Draft => Err(AppError::invalid_state(
                "Reports cannot be moved back to draft",
            )),
        }
    }
}
