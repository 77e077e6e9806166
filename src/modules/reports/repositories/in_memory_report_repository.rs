// In-process report store
//
// Entities live in flat tables keyed by foreign key (an arena) rather than as an
// object graph. All tables sit behind one lock, so every write (creation with its
// daily report, cascading delete, entry edit with its status check) is applied as
// a single unit.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::report_repository::{
    daily_not_found, entry_not_found, monthly_not_found, period_conflict, ReportRepository,
    StatusChange,
};
use crate::core::{Page, ReportCoordinate, ReportPeriod, Result};
use crate::modules::reports::models::{
    DailyFinancialReport, DailyFinancialReportEntry, MonthlyReport,
};
use crate::modules::reports::services::status_workflow::{StatusWorkflow, TransitionContext};

#[derive(Debug, Default)]
struct ReportArena {
    next_seq: u64,
    /// Monthly reports by insertion sequence
    monthly: BTreeMap<u64, MonthlyReport>,
    /// Period key -> insertion sequence
    period_index: HashMap<ReportPeriod, u64>,
    /// Daily financial reports, stored without their entries
    daily: HashMap<ReportPeriod, DailyFinancialReport>,
    entries: BTreeMap<(ReportPeriod, u32), DailyFinancialReportEntry>,
}

impl ReportArena {
    fn monthly(&self, period: ReportPeriod) -> Option<&MonthlyReport> {
        self.period_index
            .get(&period)
            .and_then(|seq| self.monthly.get(seq))
    }

    fn monthly_mut(&mut self, period: ReportPeriod) -> Option<&mut MonthlyReport> {
        let seq = *self.period_index.get(&period)?;
        self.monthly.get_mut(&seq)
    }

    /// Monthly report at the coordinate, if the coordinate's school holds it
    fn owned(&self, coordinate: ReportCoordinate) -> Result<&MonthlyReport> {
        self.monthly(coordinate.period)
            .filter(|report| report.belongs_to(coordinate.school_id))
            .ok_or_else(|| monthly_not_found(coordinate.period))
    }

    fn entries_of(&self, period: ReportPeriod) -> Vec<DailyFinancialReportEntry> {
        self.entries
            .range((period, u32::MIN)..=(period, u32::MAX))
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    fn entry_count(&self, period: ReportPeriod) -> usize {
        self.entries
            .range((period, u32::MIN)..=(period, u32::MAX))
            .count()
    }

    fn daily_with_entries(&self, period: ReportPeriod) -> Option<DailyFinancialReport> {
        self.daily.get(&period).map(|daily| {
            let mut daily = daily.clone();
            daily.entries = self.entries_of(period);
            daily
        })
    }

    /// Entry edits need both owning reports present, held by the school and in draft
    fn ensure_entries_editable(&self, coordinate: ReportCoordinate) -> Result<()> {
        let period = coordinate.period;
        let monthly = self.owned(coordinate)?;
        let daily = self.daily.get(&period).ok_or_else(|| daily_not_found(period))?;

        StatusWorkflow::ensure_editable(monthly.status)?;
        StatusWorkflow::ensure_editable(daily.status)
    }

    fn touch(&mut self, period: ReportPeriod) {
        if let Some(monthly) = self.monthly_mut(period) {
            monthly.last_modified = Utc::now();
        }
    }
}

/// Report repository backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryReportRepository {
    arena: RwLock<ReportArena>,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn create_monthly_report(&self, report: &MonthlyReport) -> Result<MonthlyReport> {
        let mut arena = self.arena.write().await;

        if arena.period_index.contains_key(&report.period) {
            return Err(period_conflict(report.period));
        }

        let seq = arena.next_seq;
        arena.next_seq += 1;
        arena.period_index.insert(report.period, seq);
        arena.monthly.insert(seq, report.clone());
        arena.daily.insert(
            report.period,
            DailyFinancialReport::new(report.period, report.prepared_by.clone()),
        );

        Ok(report.clone())
    }

    async fn find_monthly_report(
        &self,
        coordinate: ReportCoordinate,
    ) -> Result<Option<MonthlyReport>> {
        Ok(self.arena.read().await.owned(coordinate).ok().cloned())
    }

    async fn list_monthly_reports(
        &self,
        school_id: Option<i64>,
        page: Page,
    ) -> Result<Vec<MonthlyReport>> {
        let arena = self.arena.read().await;

        Ok(arena
            .monthly
            .values()
            .filter(|report| school_id.map_or(true, |id| report.belongs_to(id)))
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn delete_monthly_report(&self, coordinate: ReportCoordinate) -> Result<()> {
        let mut arena = self.arena.write().await;
        let period = coordinate.period;

        arena.owned(coordinate)?;
        let seq = arena
            .period_index
            .remove(&period)
            .ok_or_else(|| monthly_not_found(period))?;

        arena.entries.retain(|(parent, _), _| *parent != period);
        arena.daily.remove(&period);
        arena.monthly.remove(&seq);

        Ok(())
    }

    async fn find_daily_financial_report(
        &self,
        coordinate: ReportCoordinate,
    ) -> Result<Option<DailyFinancialReport>> {
        let arena = self.arena.read().await;
        if arena.owned(coordinate).is_err() {
            return Ok(None);
        }
        Ok(arena.daily_with_entries(coordinate.period))
    }

    async fn find_entry(
        &self,
        coordinate: ReportCoordinate,
        day: u32,
    ) -> Result<Option<DailyFinancialReportEntry>> {
        let arena = self.arena.read().await;
        if arena.owned(coordinate).is_err() {
            return Ok(None);
        }
        Ok(arena.entries.get(&(coordinate.period, day)).cloned())
    }

    async fn upsert_entry(
        &self,
        school_id: i64,
        entry: &DailyFinancialReportEntry,
    ) -> Result<DailyFinancialReportEntry> {
        let mut arena = self.arena.write().await;

        arena.ensure_entries_editable(ReportCoordinate {
            school_id,
            period: entry.parent,
        })?;
        arena
            .entries
            .insert((entry.parent, entry.day), entry.clone());
        arena.touch(entry.parent);

        Ok(entry.clone())
    }

    async fn delete_entry(&self, coordinate: ReportCoordinate, day: u32) -> Result<()> {
        let mut arena = self.arena.write().await;
        let period = coordinate.period;

        arena.ensure_entries_editable(coordinate)?;
        arena
            .entries
            .remove(&(period, day))
            .ok_or_else(|| entry_not_found(period, day))?;
        arena.touch(period);

        Ok(())
    }

    async fn transition_monthly_report(
        &self,
        coordinate: ReportCoordinate,
        change: &StatusChange,
    ) -> Result<MonthlyReport> {
        let mut arena = self.arena.write().await;
        let period = coordinate.period;

        arena.owned(coordinate)?;
        let entry_count = arena.entry_count(period);
        let monthly = arena
            .monthly_mut(period)
            .ok_or_else(|| monthly_not_found(period))?;

        let context = TransitionContext {
            entry_count,
            prepared_by: &monthly.prepared_by,
            reviewer: change.reviewer(),
        };
        let status = StatusWorkflow::transition(monthly.status, change.target, &context)?;

        monthly.status = status;
        if let Some(reviewer) = change.reviewer() {
            monthly.noted_by = Some(reviewer.to_string());
        }
        monthly.last_modified = Utc::now();

        Ok(monthly.clone())
    }

    async fn transition_daily_financial_report(
        &self,
        coordinate: ReportCoordinate,
        change: &StatusChange,
    ) -> Result<DailyFinancialReport> {
        let mut arena = self.arena.write().await;
        let period = coordinate.period;

        arena.owned(coordinate)?;
        let entry_count = arena.entry_count(period);
        let daily = arena
            .daily
            .get_mut(&period)
            .ok_or_else(|| daily_not_found(period))?;

        let context = TransitionContext {
            entry_count,
            prepared_by: &daily.prepared_by,
            reviewer: change.reviewer(),
        };
        let status = StatusWorkflow::transition(daily.status, change.target, &context)?;

        daily.status = status;
        if let Some(reviewer) = change.reviewer() {
            daily.noted_by = Some(reviewer.to_string());
        }
        arena.touch(period);

        arena
            .daily_with_entries(period)
            .ok_or_else(|| daily_not_found(period))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
