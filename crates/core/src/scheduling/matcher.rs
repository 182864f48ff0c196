use chrono::NaiveTime;
use uuid::Uuid;

use crate::models::{AvailabilityWindow, DayOfWeek};
use crate::scheduling::{availability, conflict, conflict::LedgerEntry};

/// One operator up for matching: their weekly windows and their committed
/// appointments for the requested date. Candidates arrive in the directory's
/// stable order and are evaluated in that order.
#[derive(Debug, Clone)]
pub struct OperatorCandidate {
    pub operator_id: Uuid,
    pub windows: Vec<AvailabilityWindow>,
    pub booked: Vec<LedgerEntry>,
}

impl OperatorCandidate {
    /// The three gates every assignment passes: works that day, the slot is
    /// contained in a window, and no committed appointment overlaps it.
    pub fn is_eligible(&self, day: DayOfWeek, start: NaiveTime, end: NaiveTime) -> bool {
        if !availability::works_on(&self.windows, day) {
            tracing::debug!(operator_id = %self.operator_id, %day, "rejected: does not work that day");
            return false;
        }
        if !availability::fits_schedule(&self.windows, day, start, end) {
            tracing::debug!(operator_id = %self.operator_id, "rejected: slot outside working windows");
            return false;
        }
        if conflict::has_conflict(&self.booked, start, end, None) {
            tracing::debug!(operator_id = %self.operator_id, "rejected: overlapping appointment");
            return false;
        }
        true
    }
}

/// First-fit: the first candidate passing all three gates, or None when the
/// eligible set is empty (a legitimate booking rejection, not an error).
pub fn find_one(
    candidates: &[OperatorCandidate],
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
) -> Option<Uuid> {
    candidates
        .iter()
        .find(|c| c.is_eligible(day, start, end))
        .map(|c| c.operator_id)
}

/// Every eligible operator, in stable input order.
pub fn find_all(
    candidates: &[OperatorCandidate],
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
) -> Vec<Uuid> {
    candidates
        .iter()
        .filter(|c| c.is_eligible(day, start, end))
        .map(|c| c.operator_id)
        .collect()
}
