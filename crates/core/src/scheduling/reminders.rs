use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{NotificationPreference, ReminderKind};

/// Day-before reminders fire at a fixed local wall-clock time.
fn day_before_fire_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("09:00:00 is a valid time")
}

/// Computes the reminder instants for an appointment slot under the
/// recipient's preferences. Only kinds the user has enabled and whose firing
/// instant lies strictly in the future of `now` are returned:
///
/// - DAY_BEFORE fires at 09:00 on the day preceding the appointment date;
/// - HOURS_BEFORE fires `reminder_offset_hours` (1..=6) before the start.
pub fn reminder_times(
    date: NaiveDate,
    start: NaiveTime,
    prefs: &NotificationPreference,
    now: NaiveDateTime,
) -> Vec<(ReminderKind, NaiveDateTime)> {
    let mut times = Vec::new();

    if prefs.wants(ReminderKind::DayBefore) {
        let fires_at = (date - Duration::days(1)).and_time(day_before_fire_time());
        if fires_at > now {
            times.push((ReminderKind::DayBefore, fires_at));
        }
    }

    if prefs.wants(ReminderKind::HoursBefore) {
        let offset = i64::from(prefs.reminder_offset_hours.clamp(1, 6));
        let fires_at = date.and_time(start) - Duration::hours(offset);
        if fires_at > now {
            times.push((ReminderKind::HoursBefore, fires_at));
        }
    }

    times
}
