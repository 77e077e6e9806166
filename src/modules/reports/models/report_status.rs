use serde::{Deserialize, Serialize};

/// Report lifecycle shared by monthly and daily financial reports
///
/// Draft -> Submitted -> Reviewed. Reviewed is terminal here; backward moves
/// (returning a report to its preparer) belong to administrative tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Being prepared; the only state in which entries may change
    Draft,

    /// Handed in by the preparer, awaiting review
    Submitted,

    /// Noted by a reviewer other than the preparer
    Reviewed,
}

impl Default for ReportStatus {
    fn default() -> Self {
        ReportStatus::Draft
    }
}

impl ReportStatus {
    /// The single forward step out of this state, if any
    pub fn next(self) -> Option<ReportStatus> {
        match self {
            ReportStatus::Draft => Some(ReportStatus::Submitted),
            ReportStatus::Submitted => Some(ReportStatus::Reviewed),
            ReportStatus::Reviewed => None,
        }
    }

    pub fn can_transition_to(self, target: ReportStatus) -> bool {
        self.next() == Some(target)
    }

    pub fn is_editable(self) -> bool {
        self == ReportStatus::Draft
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Submitted => "submitted",
            ReportStatus::Reviewed => "reviewed",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ReportStatus::Draft),
            "submitted" => Ok(ReportStatus::Submitted),
            "reviewed" => Ok(ReportStatus::Reviewed),
            _ => Err(format!("Invalid report status: {}", s)),
        }
    }
}
