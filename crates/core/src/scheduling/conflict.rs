use chrono::NaiveTime;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus};

/// A committed appointment's slot as seen by the conflict detector. Only the
/// fields the overlap test needs; built from full appointments or straight
/// from ledger rows.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub deleted: bool,
}

impl LedgerEntry {
    /// Cancelled, failed and soft-deleted appointments release their slot.
    pub fn blocks(&self) -> bool {
        !self.deleted
            && !matches!(
                self.status,
                AppointmentStatus::Cancelled | AppointmentStatus::Failed
            )
    }
}

impl From<&Appointment> for LedgerEntry {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            status: appointment.status,
            deleted: appointment.deleted,
        }
    }
}

/// Half-open interval overlap: [a_start, a_end) and [b_start, b_end)
/// conflict iff a_start < b_end && a_end > b_start. Touching edges do not
/// conflict.
pub fn overlaps(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Whether [start, end) collides with any blocking entry in the ledger.
/// When validating an edit, `exclude_id` removes the appointment's own row
/// from the comparison set.
pub fn has_conflict(
    entries: &[LedgerEntry],
    start: NaiveTime,
    end: NaiveTime,
    exclude_id: Option<Uuid>,
) -> bool {
    entries
        .iter()
        .filter(|e| e.blocks())
        .filter(|e| Some(e.id) != exclude_id)
        .any(|e| overlaps(start, end, e.start_time, e.end_time))
}
