use chrono::NaiveTime;

use crate::models::{AvailabilityWindow, DayOfWeek};

/// Whether the operator has at least one active window on the given day.
/// An operator with zero active windows on a day never works that day.
pub fn works_on(windows: &[AvailabilityWindow], day: DayOfWeek) -> bool {
    windows.iter().any(|w| w.active && w.day_of_week == day)
}

/// Whether [start, end) is fully contained in one of the operator's active
/// windows for the day. Containment, not overlap: a request that merely
/// touches a window is rejected.
pub fn fits_schedule(
    windows: &[AvailabilityWindow],
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
) -> bool {
    windows
        .iter()
        .filter(|w| w.active && w.day_of_week == day)
        .any(|w| w.start_time <= start && end <= w.end_time)
}

/// Whether a candidate window overlaps any existing *active* window for the
/// same operator and day. Enforces the no-overlapping-active-windows
/// invariant at window creation/update; `exclude_id` skips the window being
/// edited.
pub fn window_overlaps_existing(
    existing: &[AvailabilityWindow],
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
    exclude_id: Option<uuid::Uuid>,
) -> bool {
    existing
        .iter()
        .filter(|w| w.active && w.day_of_week == day)
        .filter(|w| Some(w.id) != exclude_id)
        .any(|w| start < w.end_time && end > w.start_time)
}
