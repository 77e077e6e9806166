// MySQL report store
//
// Tables: monthly_reports (PK id = period), daily_financial_reports (PK parent),
// daily_financial_report_entries (PK parent, day). Every write runs in one
// transaction; uniqueness of the period is left to the primary key so that two
// concurrent creations cannot both succeed. Statements addressed by a coordinate
// carry `submitted_by_school = ?` next to the period, so ownership is checked by
// the same statement (and row lock) that reads or writes.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::mysql::{MySqlConnection, MySqlPool, MySqlRow};
use sqlx::Row;

use super::report_repository::{
    daily_not_found, entry_not_found, monthly_not_found, period_conflict, ReportRepository,
    StatusChange,
};
use crate::core::{AppError, Page, ReportCoordinate, ReportPeriod, Result};
use crate::modules::reports::models::{
    DailyFinancialReport, DailyFinancialReportEntry, MonthlyReport, ReportStatus,
};
use crate::modules::reports::services::status_workflow::{StatusWorkflow, TransitionContext};

pub struct MySqlReportRepository {
    pool: MySqlPool,
}

impl MySqlReportRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn parse_status(raw: &str) -> Result<ReportStatus> {
    raw.parse::<ReportStatus>().map_err(AppError::Internal)
}

fn monthly_from_row(row: &MySqlRow) -> Result<MonthlyReport> {
    let id: NaiveDate = row.try_get("id")?;
    let status: String = row.try_get("report_status")?;

    Ok(MonthlyReport {
        period: ReportPeriod::from_date(id)?,
        name: row.try_get("name")?,
        school_id: row.try_get("submitted_by_school")?,
        status: parse_status(&status)?,
        prepared_by: row.try_get("prepared_by")?,
        noted_by: row.try_get("noted_by")?,
        last_modified: row.try_get("last_modified")?,
    })
}

fn entry_from_row(row: &MySqlRow) -> Result<DailyFinancialReportEntry> {
    let parent: NaiveDate = row.try_get("parent")?;
    let day: u8 = row.try_get("day")?;

    Ok(DailyFinancialReportEntry {
        parent: ReportPeriod::from_date(parent)?,
        day: u32::from(day),
        sales: row.try_get("sales")?,
        purchases: row.try_get("purchases")?,
    })
}

fn day_column(day: u32) -> Result<u8> {
    u8::try_from(day).map_err(|_| AppError::invalid_argument(format!("day {} is out of range", day)))
}

async fn load_daily(
    conn: &mut MySqlConnection,
    coordinate: ReportCoordinate,
) -> Result<Option<DailyFinancialReport>> {
    let period = coordinate.period;
    let row = sqlx::query(
        r#"
        SELECT d.report_status, d.prepared_by, d.noted_by
        FROM daily_financial_reports d
        JOIN monthly_reports m ON m.id = d.parent
        WHERE d.parent = ? AND m.submitted_by_school = ?
        "#,
    )
    .bind(period.as_date())
    .bind(coordinate.school_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let status: String = row.try_get("report_status")?;
    let entries = sqlx::query(
        r#"
        SELECT parent, day, sales, purchases
        FROM daily_financial_report_entries
        WHERE parent = ?
        ORDER BY day
        "#,
    )
    .bind(period.as_date())
    .fetch_all(&mut *conn)
    .await?
    .iter()
    .map(entry_from_row)
    .collect::<Result<Vec<_>>>()?;

    Ok(Some(DailyFinancialReport {
        parent: period,
        status: parse_status(&status)?,
        prepared_by: row.try_get("prepared_by")?,
        noted_by: row.try_get("noted_by")?,
        entries,
    }))
}

async fn count_entries(conn: &mut MySqlConnection, period: ReportPeriod) -> Result<usize> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM daily_financial_report_entries WHERE parent = ?",
    )
    .bind(period.as_date())
    .fetch_one(&mut *conn)
    .await?;

    Ok(usize::try_from(count).unwrap_or(0))
}

/// Lock both owning reports and check that entries may still change
async fn lock_for_entry_edit(
    conn: &mut MySqlConnection,
    coordinate: ReportCoordinate,
) -> Result<()> {
    let row = sqlx::query(
        r#"
        SELECT m.report_status AS monthly_status, d.report_status AS daily_status
        FROM monthly_reports m
        JOIN daily_financial_reports d ON d.parent = m.id
        WHERE m.id = ? AND m.submitted_by_school = ?
        FOR UPDATE
        "#,
    )
    .bind(coordinate.period.as_date())
    .bind(coordinate.school_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| monthly_not_found(coordinate.period))?;

    let monthly_status: String = row.try_get("monthly_status")?;
    let daily_status: String = row.try_get("daily_status")?;

    StatusWorkflow::ensure_editable(parse_status(&monthly_status)?)?;
    StatusWorkflow::ensure_editable(parse_status(&daily_status)?)
}

async fn touch_monthly(conn: &mut MySqlConnection, period: ReportPeriod) -> Result<()> {
    sqlx::query("UPDATE monthly_reports SET last_modified = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(period.as_date())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[async_trait]
impl ReportRepository for MySqlReportRepository {
    async fn create_monthly_report(&self, report: &MonthlyReport) -> Result<MonthlyReport> {
        let mut tx = self.pool.begin().await?;

        // The primary key on id rejects a second report for the same month, including
        // one racing in from another connection.
        sqlx::query(
            r#"
            INSERT INTO monthly_reports (
                id, name, submitted_by_school, report_status,
                prepared_by, noted_by, last_modified
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(report.period.as_date())
        .bind(report.name.as_deref())
        .bind(report.school_id)
        .bind(report.status.as_str())
        .bind(&report.prepared_by)
        .bind(report.noted_by.as_deref())
        .bind(report.last_modified)
        .execute(&mut *tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => period_conflict(report.period),
            other => other,
        })?;

        sqlx::query(
            r#"
            INSERT INTO daily_financial_reports (parent, report_status, prepared_by, noted_by)
            VALUES (?, ?, ?, NULL)
            "#,
        )
        .bind(report.period.as_date())
        .bind(ReportStatus::Draft.as_str())
        .bind(&report.prepared_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(report.clone())
    }

    async fn find_monthly_report(
        &self,
        coordinate: ReportCoordinate,
    ) -> Result<Option<MonthlyReport>> {
        sqlx::query(
            r#"
            SELECT id, name, submitted_by_school, report_status,
                   prepared_by, noted_by, last_modified
            FROM monthly_reports
            WHERE id = ? AND submitted_by_school = ?
            "#,
        )
        .bind(coordinate.period.as_date())
        .bind(coordinate.school_id)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(monthly_from_row)
        .transpose()
    }

    async fn list_monthly_reports(
        &self,
        school_id: Option<i64>,
        page: Page,
    ) -> Result<Vec<MonthlyReport>> {
        let query = match school_id {
            Some(school_id) => sqlx::query(
                r#"
                SELECT id, name, submitted_by_school, report_status,
                       prepared_by, noted_by, last_modified
                FROM monthly_reports
                WHERE submitted_by_school = ?
                ORDER BY seq
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(school_id),
            None => sqlx::query(
                r#"
                SELECT id, name, submitted_by_school, report_status,
                       prepared_by, noted_by, last_modified
                FROM monthly_reports
                ORDER BY seq
                LIMIT ? OFFSET ?
                "#,
            ),
        };

        query
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(monthly_from_row)
            .collect()
    }

    async fn delete_monthly_report(&self, coordinate: ReportCoordinate) -> Result<()> {
        let period = coordinate.period;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "SELECT id FROM monthly_reports WHERE id = ? AND submitted_by_school = ? FOR UPDATE",
        )
        .bind(period.as_date())
        .bind(coordinate.school_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| monthly_not_found(period))?;

        sqlx::query("DELETE FROM daily_financial_report_entries WHERE parent = ?")
            .bind(period.as_date())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM daily_financial_reports WHERE parent = ?")
            .bind(period.as_date())
            .execute(&mut *tx)
            .await?;

        let deleted =
            sqlx::query("DELETE FROM monthly_reports WHERE id = ? AND submitted_by_school = ?")
                .bind(period.as_date())
                .bind(coordinate.school_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        if deleted == 0 {
            // Dropping the transaction rolls back the child deletes
            return Err(monthly_not_found(period));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_daily_financial_report(
        &self,
        coordinate: ReportCoordinate,
    ) -> Result<Option<DailyFinancialReport>> {
        // One snapshot for the report row and its entries
        let mut tx = self.pool.begin().await?;
        let report = load_daily(&mut tx, coordinate).await?;
        tx.commit().await?;
        Ok(report)
    }

    async fn find_entry(
        &self,
        coordinate: ReportCoordinate,
        day: u32,
    ) -> Result<Option<DailyFinancialReportEntry>> {
        sqlx::query(
            r#"
            SELECT e.parent, e.day, e.sales, e.purchases
            FROM daily_financial_report_entries e
            JOIN monthly_reports m ON m.id = e.parent
            WHERE e.parent = ? AND e.day = ? AND m.submitted_by_school = ?
            "#,
        )
        .bind(coordinate.period.as_date())
        .bind(day_column(day)?)
        .bind(coordinate.school_id)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(entry_from_row)
        .transpose()
    }

    async fn upsert_entry(
        &self,
        school_id: i64,
        entry: &DailyFinancialReportEntry,
    ) -> Result<DailyFinancialReportEntry> {
        let mut tx = self.pool.begin().await?;

        let coordinate = ReportCoordinate {
            school_id,
            period: entry.parent,
        };
        lock_for_entry_edit(&mut tx, coordinate).await?;

        sqlx::query(
            r#"
            INSERT INTO daily_financial_report_entries (parent, day, sales, purchases)
            VALUES (?, ?, ?, ?) AS new
            ON DUPLICATE KEY UPDATE sales = new.sales, purchases = new.purchases
            "#,
        )
        .bind(entry.parent.as_date())
        .bind(day_column(entry.day)?)
        .bind(entry.sales)
        .bind(entry.purchases)
        .execute(&mut *tx)
        .await?;

        touch_monthly(&mut tx, entry.parent).await?;
        tx.commit().await?;

        Ok(entry.clone())
    }

    async fn delete_entry(&self, coordinate: ReportCoordinate, day: u32) -> Result<()> {
        let period = coordinate.period;
        let mut tx = self.pool.begin().await?;

        lock_for_entry_edit(&mut tx, coordinate).await?;

        let deleted = sqlx::query(
            "DELETE FROM daily_financial_report_entries WHERE parent = ? AND day = ?",
        )
        .bind(period.as_date())
        .bind(day_column(day)?)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if deleted == 0 {
            return Err(entry_not_found(period, day));
        }

        touch_monthly(&mut tx, period).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn transition_monthly_report(
        &self,
        coordinate: ReportCoordinate,
        change: &StatusChange,
    ) -> Result<MonthlyReport> {
        let period = coordinate.period;
        let mut tx = self.pool.begin().await?;

        let mut report = sqlx::query(
            r#"
            SELECT id, name, submitted_by_school, report_status,
                   prepared_by, noted_by, last_modified
            FROM monthly_reports
            WHERE id = ? AND submitted_by_school = ?
            FOR UPDATE
            "#,
        )
        .bind(period.as_date())
        .bind(coordinate.school_id)
        .fetch_optional(&mut *tx)
        .await?
        .as_ref()
        .map(monthly_from_row)
        .transpose()?
        .ok_or_else(|| monthly_not_found(period))?;

        let entry_count = count_entries(&mut tx, period).await?;
        let context = TransitionContext {
            entry_count,
            prepared_by: &report.prepared_by,
            reviewer: change.reviewer(),
        };
        report.status = StatusWorkflow::transition(report.status, change.target, &context)?;
        if let Some(reviewer) = change.reviewer() {
            report.noted_by = Some(reviewer.to_string());
        }
        report.last_modified = Utc::now();

        sqlx::query(
            r#"
            UPDATE monthly_reports
            SET report_status = ?, noted_by = ?, last_modified = ?
            WHERE id = ?
            "#,
        )
        .bind(report.status.as_str())
        .bind(report.noted_by.as_deref())
        .bind(report.last_modified)
        .bind(period.as_date())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(report)
    }

    async fn transition_daily_financial_report(
        &self,
        coordinate: ReportCoordinate,
        change: &StatusChange,
    ) -> Result<DailyFinancialReport> {
        let period = coordinate.period;
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT d.report_status, d.prepared_by
            FROM daily_financial_reports d
            JOIN monthly_reports m ON m.id = d.parent
            WHERE d.parent = ? AND m.submitted_by_school = ?
            FOR UPDATE
            "#,
        )
        .bind(period.as_date())
        .bind(coordinate.school_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| monthly_not_found(period))?;

        let current: String = row.try_get("report_status")?;
        let prepared_by: String = row.try_get("prepared_by")?;

        let entry_count = count_entries(&mut tx, period).await?;
        let context = TransitionContext {
            entry_count,
            prepared_by: &prepared_by,
            reviewer: change.reviewer(),
        };
        let status = StatusWorkflow::transition(parse_status(&current)?, change.target, &context)?;

        sqlx::query(
            r#"
            UPDATE daily_financial_reports
            SET report_status = ?, noted_by = COALESCE(?, noted_by)
            WHERE parent = ?
            "#,
        )
        .bind(status.as_str())
        .bind(change.reviewer())
        .bind(period.as_date())
        .execute(&mut *tx)
        .await?;

        touch_monthly(&mut tx, period).await?;

        let report = load_daily(&mut tx, coordinate)
            .await?
            .ok_or_else(|| daily_not_found(period))?;

        tx.commit().await?;
        Ok(report)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
