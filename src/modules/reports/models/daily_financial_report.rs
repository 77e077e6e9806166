// Daily financial report model
//
// One per monthly report (same period key). Holds the per-day sales and
// purchases entries for the month, ordered by day.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::report_status::ReportStatus;
use crate::core::{AppError, ReportPeriod, Result};

pub const MIN_DAY: u32 = 1;
pub const MAX_DAY: u32 = 31;

/// Fractional digits an amount may carry (the store keeps four)
pub const MAX_AMOUNT_SCALE: u32 = 4;

/// Amounts must stay below 10^15
pub fn max_amount_exclusive() -> Decimal {
    Decimal::from(1_000_000_000_000_000i64)
}

/// Financial report for the month of [MONTH], [YEAR]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyFinancialReport {
    /// Period key of the owning monthly report
    pub parent: ReportPeriod,

    #[serde(rename = "reportStatus")]
    pub status: ReportStatus,

    pub prepared_by: String,

    pub noted_by: Option<String>,

    /// Entries ordered by day (loaded alongside the report, stored separately)
    #[serde(default)]
    pub entries: Vec<DailyFinancialReportEntry>,
}

impl DailyFinancialReport {
    pub fn new(parent: ReportPeriod, prepared_by: impl Into<String>) -> Self {
        Self {
            parent,
            status: ReportStatus::Draft,
            prepared_by: prepared_by.into(),
            noted_by: None,
            entries: Vec::new(),
        }
    }

    pub fn total_sales(&self) -> Decimal {
        self.entries.iter().map(|e| e.sales).sum()
    }

    pub fn total_purchases(&self) -> Decimal {
        self.entries.iter().map(|e| e.purchases).sum()
    }
}

/// Sales and purchases recorded for one day of the month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFinancialReportEntry {
    pub parent: ReportPeriod,
    pub day: u32,
    pub sales: Decimal,
    pub purchases: Decimal,
}

impl DailyFinancialReportEntry {
    /// Validated entry. Day must be within 1..=31; both amounts non-negative,
    /// below 10^15 and with at most four fractional digits. Whether the day
    /// exists in the parent's month is the caller's check.
    pub fn new(parent: ReportPeriod, day: u32, sales: Decimal, purchases: Decimal) -> Result<Self> {
        Self::validate_day(day)?;
        Self::validate_amount("sales", sales)?;
        Self::validate_amount("purchases", purchases)?;

        Ok(Self {
            parent,
            day,
            sales,
            purchases,
        })
    }

    pub fn validate_day(day: u32) -> Result<()> {
        if !(MIN_DAY..=MAX_DAY).contains(&day) {
            return Err(AppError::invalid_argument(format!(
                "day must be between {} and {}, got {}",
                MIN_DAY, MAX_DAY, day
            )));
        }
        Ok(())
    }

    fn validate_amount(field: &str, amount: Decimal) -> Result<()> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(AppError::invalid_argument(format!(
                "{} must be non-negative, got {}",
                field, amount
            )));
        }
        if amount.normalize().scale() > MAX_AMOUNT_SCALE {
            return Err(AppError::invalid_argument(format!(
                "{} allows at most {} decimal places, got {}",
                field, MAX_AMOUNT_SCALE, amount
            )));
        }
        if amount >= max_amount_exclusive() {
            return Err(AppError::invalid_argument(format!(
                "{} must be less than {}, got {}",
                field,
                max_amount_exclusive(),
                amount
            )));
        }
        Ok(())
    }

    /// Net amount for the day
    pub fn net(&self) -> Decimal {
        self.sales - self.purchases
    }
}

/// Body of an entry upsert
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DailyEntryData {
    pub sales: Decimal,
    pub purchases: Decimal,
}
