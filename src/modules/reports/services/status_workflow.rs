//! Report status state machine.
//!
//! Stateless rules shared by both report kinds. Repositories call these inside
//! the same transaction that applies the change, so the facts the rules look at
//! (current status, entry count, preparer) cannot move underneath them.

use crate::core::{AppError, Result};
use crate::modules::reports::models::ReportStatus;

/// Facts about a report needed to judge a transition
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    /// Number of day entries recorded in the daily financial report
    pub entry_count: usize,
    pub prepared_by: &'a str,
    /// User performing the review, if the transition is a review
    pub reviewer: Option<&'a str>,
}

pub struct StatusWorkflow;

impl StatusWorkflow {
    /// Entries may only change while the report is a draft
    pub fn ensure_editable(status: ReportStatus) -> Result<()> {
        if !status.is_editable() {
            return Err(AppError::invalid_state(format!(
                "Report is {} and can no longer be edited",
                status
            )));
        }
        Ok(())
    }

    /// Draft -> Submitted. Requires at least one recorded day.
    pub fn submit(current: ReportStatus, entry_count: usize) -> Result<ReportStatus> {
        Self::ensure_step(current, ReportStatus::Submitted)?;

        if entry_count == 0 {
            return Err(AppError::invalid_state(
                "Report has no entries and cannot be submitted",
            ));
        }

        Ok(ReportStatus::Submitted)
    }

    /// Submitted -> Reviewed. The reviewer must be set and differ from the preparer.
    pub fn review(
        current: ReportStatus,
        prepared_by: &str,
        reviewer: Option<&str>,
    ) -> Result<ReportStatus> {
        Self::ensure_step(current, ReportStatus::Reviewed)?;

        match reviewer {
            None => Err(AppError::invalid_state("Review requires a reviewer")),
            Some(reviewer) if reviewer == prepared_by => Err(AppError::invalid_state(
                "Reviewer must be different from the preparer",
            )),
            Some(_) => Ok(ReportStatus::Reviewed),
        }
    }

    /// Apply the rule for `target`
    pub fn transition(
        current: ReportStatus,
        target: ReportStatus,
        context: &TransitionContext<'_>,
    ) -> Result<ReportStatus> {
        match target {
            ReportStatus::Submitted => Self::submit(current, context.entry_count),
            ReportStatus::Reviewed => Self::review(current, context.prepared_by, context.reviewer),
            ReportStatus::Draft => Err(AppError::invalid_state(format!(
                "Invalid status transition from {} to {}",
                current, target
            ))),
        }
    }

    fn ensure_step(current: ReportStatus, target: ReportStatus) -> Result<()> {
        if !current.can_transition_to(target) {
            return Err(AppError::invalid_state(format!(
                "Invalid status transition from {} to {}",
                current, target
            )));
        }
        Ok(())
    }
}
