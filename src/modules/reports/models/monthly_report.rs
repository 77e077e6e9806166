// Monthly report model
//
// The root of the report graph. Keyed by its period (first day of the month);
// the owning school is an attribute, not part of the key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::report_status::ReportStatus;
use crate::core::ReportPeriod;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    /// Period key, immutable once created
    #[serde(rename = "id")]
    pub period: ReportPeriod,

    /// Optional display name
    pub name: Option<String>,

    /// School that owns the report
    #[serde(rename = "submittedBySchool")]
    pub school_id: i64,

    #[serde(rename = "reportStatus")]
    pub status: ReportStatus,

    /// User that created the report
    pub prepared_by: String,

    /// Reviewer, set on Submitted -> Reviewed
    pub noted_by: Option<String>,

    pub last_modified: DateTime<Utc>,
}

impl MonthlyReport {
    /// A fresh report: Draft, no reviewer, stamped with `now`
    pub fn new(
        period: ReportPeriod,
        school_id: i64,
        name: Option<String>,
        prepared_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            period,
            name,
            school_id,
            status: ReportStatus::Draft,
            prepared_by: prepared_by.into(),
            noted_by: None,
            last_modified: now,
        }
    }

    pub fn belongs_to(&self, school_id: i64) -> bool {
        self.school_id == school_id
    }
}
