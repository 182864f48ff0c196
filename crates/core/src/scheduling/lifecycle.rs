use chrono::{NaiveDateTime, NaiveTime};

use crate::errors::{BookingError, BookingResult};
use crate::models::{Appointment, AppointmentStatus, AttendanceStatus, Role};

pub const MIN_DURATION_MINUTES: i64 = 5;

/// Validates the requested slot times: end strictly after start by at least
/// the minimum duration. Windows never wrap midnight, so end <= start is
/// rejected rather than interpreted as next-day.
pub fn validate_slot_times(start: NaiveTime, end: NaiveTime) -> BookingResult<()> {
    if end < start + chrono::Duration::minutes(MIN_DURATION_MINUTES) {
        return Err(BookingError::Validation(format!(
            "appointment must last at least {} minutes",
            MIN_DURATION_MINUTES
        )));
    }
    Ok(())
}

/// Resolves the requested slot's end from either an explicit end time or a
/// duration, then validates it. Slots never wrap midnight: a duration that
/// crosses into the next day is rejected rather than wrapped.
pub fn resolve_slot_end(
    start: NaiveTime,
    end: Option<NaiveTime>,
    duration_minutes: Option<i32>,
) -> BookingResult<(NaiveTime, i32)> {
    let end = match (end, duration_minutes) {
        (Some(end), _) => end,
        (None, Some(minutes)) => {
            if minutes <= 0 {
                return Err(BookingError::Validation(
                    "duration must be positive".to_string(),
                ));
            }
            let (end, wrapped) =
                start.overflowing_add_signed(chrono::Duration::minutes(i64::from(minutes)));
            if wrapped != 0 {
                return Err(BookingError::Validation(
                    "appointment cannot span midnight".to_string(),
                ));
            }
            end
        }
        (None, None) => {
            return Err(BookingError::Validation(
                "either end_time or duration_minutes is required".to_string(),
            ));
        }
    };

    validate_slot_times(start, end)?;
    let duration = (end - start).num_minutes() as i32;
    Ok((end, duration))
}

pub fn validate_rating(rating: i32) -> BookingResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(BookingError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

fn ensure_not_terminal(appointment: &Appointment) -> BookingResult<()> {
    if appointment.status.is_terminal() {
        return Err(BookingError::State(format!(
            "appointment is already {}",
            appointment.status
        )));
    }
    Ok(())
}

/// A slot edit is only legal while the appointment is still SCHEDULED and
/// not soft-deleted.
pub fn ensure_modifiable(appointment: &Appointment) -> BookingResult<()> {
    if appointment.deleted {
        return Err(BookingError::State("appointment has been removed".to_string()));
    }
    ensure_not_terminal(appointment)?;
    if appointment.status != AppointmentStatus::Scheduled {
        return Err(BookingError::State(format!(
            "only scheduled appointments can be modified, current status is {}",
            appointment.status
        )));
    }
    Ok(())
}

/// Cancellation is legal only while SCHEDULED, by the booking customer or an
/// actor holding the operator or admin role.
pub fn ensure_cancellable(
    appointment: &Appointment,
    actor_id: uuid::Uuid,
    actor_role: Role,
) -> BookingResult<()> {
    if appointment.deleted {
        return Err(BookingError::State("appointment has been removed".to_string()));
    }
    ensure_not_terminal(appointment)?;
    if appointment.status != AppointmentStatus::Scheduled {
        return Err(BookingError::State(format!(
            "only scheduled appointments can be cancelled, current status is {}",
            appointment.status
        )));
    }
    let owns = appointment.customer_id == actor_id;
    if !owns && !matches!(actor_role, Role::Admin | Role::Operator) {
        return Err(BookingError::Authorization(
            "only the booking customer, an operator or an admin may cancel".to_string(),
        ));
    }
    Ok(())
}

/// Completion is performed by the assigned operator while the appointment is
/// SCHEDULED or IN_PROGRESS. Attendance is written here exactly once.
pub fn ensure_completable(appointment: &Appointment, operator_id: uuid::Uuid) -> BookingResult<()> {
    if appointment.deleted {
        return Err(BookingError::State("appointment has been removed".to_string()));
    }
    if appointment.operator_id != Some(operator_id) {
        return Err(BookingError::Authorization(
            "only the assigned operator may complete this appointment".to_string(),
        ));
    }
    if !matches!(
        appointment.status,
        AppointmentStatus::Scheduled | AppointmentStatus::InProgress
    ) {
        return Err(BookingError::State(format!(
            "only scheduled or in-progress appointments can be completed, current status is {}",
            appointment.status
        )));
    }
    Ok(())
}

/// The outcome the operator records: attendance implies COMPLETED, a no-show
/// implies FAILED.
pub fn completion_outcome(attended: bool) -> (AppointmentStatus, AttendanceStatus) {
    if attended {
        (AppointmentStatus::Completed, AttendanceStatus::Attended)
    } else {
        (AppointmentStatus::Failed, AttendanceStatus::NotAttended)
    }
}

/// Rating is a one-time write by the booking customer, only after the
/// appointment completed with the customer in attendance.
pub fn ensure_rateable(appointment: &Appointment, customer_id: uuid::Uuid) -> BookingResult<()> {
    if appointment.customer_id != customer_id {
        return Err(BookingError::Authorization(
            "only the booking customer may rate this appointment".to_string(),
        ));
    }
    if appointment.status != AppointmentStatus::Completed {
        return Err(BookingError::State(
            "only completed appointments can be rated".to_string(),
        ));
    }
    if appointment.attendance_status != AttendanceStatus::Attended {
        return Err(BookingError::State(
            "appointments without attendance cannot be rated".to_string(),
        ));
    }
    if appointment.customer_rating.is_some() {
        return Err(BookingError::State(
            "this appointment has already been rated".to_string(),
        ));
    }
    Ok(())
}

/// Forward transition a sweep may apply to an appointment at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTransition {
    /// SCHEDULED and currently inside its window: promote to IN_PROGRESS.
    Start,
    /// Window fully elapsed: promote SCHEDULED or IN_PROGRESS to COMPLETED.
    Complete,
}

/// Decides what, if anything, a lifecycle sweep should do with an
/// appointment at `now`. Pure and idempotent: terminal or deleted rows
/// always map to None, so re-running over an already-moved appointment is a
/// no-op, and no decision ever moves a row backward.
pub fn sweep_transition(appointment: &Appointment, now: NaiveDateTime) -> Option<SweepTransition> {
    if appointment.deleted || appointment.status.is_terminal() {
        return None;
    }

    let today = now.date();
    let time = now.time();

    let elapsed = appointment.date < today
        || (appointment.date == today && appointment.end_time < time);
    if elapsed {
        return match appointment.status {
            AppointmentStatus::Scheduled | AppointmentStatus::InProgress => {
                Some(SweepTransition::Complete)
            }
            _ => None,
        };
    }

    let in_window = appointment.date == today
        && appointment.start_time <= time
        && time <= appointment.end_time;
    if in_window && appointment.status == AppointmentStatus::Scheduled {
        return Some(SweepTransition::Start);
    }

    None
}

/// Whether an elapsed appointment still awaits the operator's completion
/// record (attendance, note, rating).
pub fn pending_completion(appointment: &Appointment, now: NaiveDateTime) -> bool {
    if appointment.deleted || appointment.completed_by_operator {
        return false;
    }
    if !matches!(
        appointment.status,
        AppointmentStatus::Scheduled | AppointmentStatus::InProgress
    ) {
        return false;
    }
    appointment.date < now.date()
        || (appointment.date == now.date() && appointment.end_time <= now.time())
}
