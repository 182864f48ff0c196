use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::models::{
    Appointment, BookAppointmentRequest, CancelAppointmentRequest, CompleteAppointmentRequest,
    DayOfWeek, RateAppointmentRequest, RescheduleAppointmentRequest, Role,
};
use slotbook_core::scheduling::{availability, conflict, lifecycle, matcher};

use slotbook_db::repositories::appointment::{self, BookOutcome, NewAppointment};
use slotbook_db::repositories::{availability as windows_repo, directory};

use crate::services::{locks::PartitionLocks, reminders};

async fn actor_role(pool: &PgPool, actor_id: Uuid) -> BookingResult<Role> {
    let role = directory::get_role(pool, actor_id)
        .await
        .map_err(BookingError::Database)?;
    // Accounts without a stored role act as plain customers
    Ok(role.as_deref().and_then(Role::parse).unwrap_or(Role::Customer))
}

async fn ensure_actor_may_act_for(
    pool: &PgPool,
    actor_id: Uuid,
    customer_id: Uuid,
) -> BookingResult<()> {
    if actor_id == customer_id {
        return Ok(());
    }
    if actor_role(pool, actor_id).await? != Role::Admin {
        return Err(BookingError::Authorization(
            "only an admin may act on another customer's appointment".to_string(),
        ));
    }
    Ok(())
}

/// Loads one operator's matching inputs: active weekly windows plus the
/// committed ledger for the requested date.
async fn load_candidate(
    pool: &PgPool,
    operator_id: Uuid,
    date: NaiveDate,
) -> BookingResult<matcher::OperatorCandidate> {
    let windows = windows_repo::list_active_windows_by_operator(pool, operator_id)
        .await
        .map_err(BookingError::Database)?
        .into_iter()
        .map(|w| w.into_domain())
        .collect::<Result<Vec<_>, _>>()
        .map_err(BookingError::Database)?;

    let booked = appointment::list_by_operator_date(pool, operator_id, date)
        .await
        .map_err(BookingError::Database)?
        .into_iter()
        .map(|a| a.into_domain())
        .collect::<Result<Vec<_>, _>>()
        .map_err(BookingError::Database)?
        .iter()
        .map(conflict::LedgerEntry::from)
        .collect();

    Ok(matcher::OperatorCandidate {
        operator_id,
        windows,
        booked,
    })
}

/// Applies the three assignment gates to an explicitly chosen operator,
/// with errors precise enough for the caller to pick a different slot.
fn check_explicit_operator(
    candidate: &matcher::OperatorCandidate,
    day: DayOfWeek,
    start: NaiveTime,
    end: NaiveTime,
    exclude_id: Option<Uuid>,
) -> BookingResult<()> {
    if !availability::works_on(&candidate.windows, day) {
        return Err(BookingError::Conflict(format!(
            "the operator does not work on {day}"
        )));
    }
    if !availability::fits_schedule(&candidate.windows, day, start, end) {
        return Err(BookingError::Conflict(
            "the requested slot is outside the operator's working hours".to_string(),
        ));
    }
    if conflict::has_conflict(&candidate.booked, start, end, exclude_id) {
        return Err(BookingError::Conflict(
            "the operator already has an appointment in that slot".to_string(),
        ));
    }
    Ok(())
}

/// Books an appointment. The operator is either supplied by the caller (and
/// gated on capability, availability and conflicts) or resolved first-fit
/// from the category's capable operators. The final overlap check and the
/// insert run as one atomic unit against the (operator, date) partition.
pub async fn book(
    pool: &PgPool,
    locks: &PartitionLocks,
    req: BookAppointmentRequest,
    now: NaiveDateTime,
) -> BookingResult<Appointment> {
    if req.title.trim().is_empty() {
        return Err(BookingError::Validation("title is required".to_string()));
    }
    let (end_time, duration_minutes) =
        lifecycle::resolve_slot_end(req.start_time, req.end_time, req.duration_minutes)?;

    let actor_id = req.actor_id.unwrap_or(req.customer_id);
    ensure_actor_may_act_for(pool, actor_id, req.customer_id).await?;

    let day = DayOfWeek::of(req.date);

    let operator_id = match req.operator_id {
        Some(operator_id) => {
            if let Some(category_id) = req.category_id {
                let capable = directory::is_capable(pool, operator_id, category_id)
                    .await
                    .map_err(BookingError::Database)?;
                if !capable {
                    return Err(BookingError::Conflict(
                        "the operator does not serve this category".to_string(),
                    ));
                }
            }
            let candidate = load_candidate(pool, operator_id, req.date).await?;
            check_explicit_operator(&candidate, day, req.start_time, end_time, None)?;
            operator_id
        }
        None => {
            let category_id = req.category_id.ok_or_else(|| {
                BookingError::Validation(
                    "either an operator or a category must be specified".to_string(),
                )
            })?;
            let capable = directory::get_capable_operators(pool, category_id)
                .await
                .map_err(BookingError::Database)?;
            if capable.is_empty() {
                return Err(BookingError::NoOperatorAvailable);
            }

            let mut candidates = Vec::with_capacity(capable.len());
            for operator_id in capable {
                candidates.push(load_candidate(pool, operator_id, req.date).await?);
            }
            matcher::find_one(&candidates, day, req.start_time, end_time)
                .ok_or(BookingError::NoOperatorAvailable)?
        }
    };

    let _guard = locks.acquire(operator_id, req.date).await;

    let outcome = appointment::book_guarded(
        pool,
        NewAppointment {
            customer_id: req.customer_id,
            operator_id,
            category_id: req.category_id,
            title: req.title,
            description: req.description,
            date: req.date,
            start_time: req.start_time,
            end_time,
            duration_minutes,
        },
    )
    .await
    .map_err(BookingError::Database)?;

    let booked = match outcome {
        BookOutcome::Booked(row) => row.into_domain().map_err(BookingError::Database)?,
        BookOutcome::Conflict => {
            return Err(BookingError::Conflict(
                "the operator already has an appointment in that slot".to_string(),
            ));
        }
    };

    // Reminder bookkeeping must never unwind a committed booking
    if let Err(e) = reminders::schedule_for_appointment(pool, &booked, now).await {
        tracing::warn!(appointment_id = %booked.id, "failed to schedule reminders: {e}");
    }

    tracing::info!(
        appointment_id = %booked.id,
        operator_id = %operator_id,
        customer_id = %booked.customer_id,
        "appointment booked"
    );
    Ok(booked)
}

/// Moves a SCHEDULED appointment to a new slot. The operator assignment is
/// immutable; the new slot passes the same gates as a fresh booking, with
/// the appointment's own row excluded from the overlap set. Unsent reminder
/// tasks are retired and re-created from the new slot.
pub async fn reschedule(
    pool: &PgPool,
    locks: &PartitionLocks,
    appointment_id: Uuid,
    req: RescheduleAppointmentRequest,
    now: NaiveDateTime,
) -> BookingResult<Appointment> {
    let existing = get(pool, appointment_id).await?;

    ensure_actor_may_act_for(pool, req.actor_id, existing.customer_id).await?;
    lifecycle::ensure_modifiable(&existing)?;

    let (end_time, duration_minutes) =
        lifecycle::resolve_slot_end(req.start_time, req.end_time, req.duration_minutes)?;

    let operator_id = existing.operator_id.ok_or_else(|| {
        BookingError::State("appointment has no assigned operator".to_string())
    })?;

    let day = DayOfWeek::of(req.date);
    let candidate = load_candidate(pool, operator_id, req.date).await?;
    check_explicit_operator(
        &candidate,
        day,
        req.start_time,
        end_time,
        Some(appointment_id),
    )?;

    if let Some(title) = &req.title {
        if title.trim().is_empty() {
            return Err(BookingError::Validation("title cannot be blank".to_string()));
        }
    }

    let _guard = locks.acquire(operator_id, req.date).await;

    let outcome = appointment::reschedule_guarded(
        pool,
        appointment_id,
        operator_id,
        req.date,
        req.start_time,
        end_time,
        duration_minutes,
        req.title.as_deref(),
        req.description.as_deref(),
    )
    .await
    .map_err(BookingError::Database)?;

    let updated = match outcome {
        BookOutcome::Booked(row) => row.into_domain().map_err(BookingError::Database)?,
        BookOutcome::Conflict => {
            return Err(BookingError::Conflict(
                "the operator already has an appointment in that slot".to_string(),
            ));
        }
    };

    if let Err(e) = reminders::reschedule_for_appointment(pool, &updated, now).await {
        tracing::warn!(appointment_id = %updated.id, "failed to reschedule reminders: {e}");
    }

    tracing::info!(appointment_id = %updated.id, "appointment rescheduled");
    Ok(updated)
}

/// Cancels a SCHEDULED appointment: soft-delete plus the CANCELLED terminal
/// status, then retirement of its unsent reminder tasks.
pub async fn cancel(
    pool: &PgPool,
    appointment_id: Uuid,
    req: CancelAppointmentRequest,
    now: NaiveDateTime,
) -> BookingResult<()> {
    let existing = get(pool, appointment_id).await?;

    let role = actor_role(pool, req.actor_id).await?;
    lifecycle::ensure_cancellable(&existing, req.actor_id, role)?;

    let cancelled = appointment::cancel_appointment(pool, appointment_id, now)
        .await
        .map_err(BookingError::Database)?;
    if cancelled.is_none() {
        // Lost a race against another transition; surface the same error the
        // validation would have produced
        return Err(BookingError::State(
            "only scheduled appointments can be cancelled".to_string(),
        ));
    }

    reminders::retire_for_appointment(pool, appointment_id).await?;

    tracing::info!(
        appointment_id = %appointment_id,
        actor_id = %req.actor_id,
        reason = req.reason.as_deref().unwrap_or(""),
        "appointment cancelled"
    );
    Ok(())
}

/// The assigned operator records the outcome: attendance implies COMPLETED,
/// a no-show implies FAILED. Attendance, note and the operator's one-time
/// rating of the encounter are written here.
pub async fn complete(
    pool: &PgPool,
    appointment_id: Uuid,
    req: CompleteAppointmentRequest,
    now: NaiveDateTime,
) -> BookingResult<Appointment> {
    let existing = get(pool, appointment_id).await?;

    lifecycle::ensure_completable(&existing, req.operator_id)?;
    if let Some(rating) = req.rating {
        lifecycle::validate_rating(rating)?;
    }

    let (status, attendance) = lifecycle::completion_outcome(req.attended);

    let completed = appointment::complete_appointment(
        pool,
        appointment_id,
        status.as_str(),
        attendance.as_str(),
        req.note.as_deref(),
        req.rating,
        now,
    )
    .await
    .map_err(BookingError::Database)?
    .into_domain()
    .map_err(BookingError::Database)?;

    tracing::info!(
        appointment_id = %appointment_id,
        attended = req.attended,
        "appointment completed by operator"
    );
    Ok(completed)
}

/// The booking customer's one-time rating of the operator, legal only for
/// COMPLETED appointments with recorded attendance.
pub async fn rate(
    pool: &PgPool,
    appointment_id: Uuid,
    req: RateAppointmentRequest,
) -> BookingResult<Appointment> {
    let existing = get(pool, appointment_id).await?;

    lifecycle::ensure_rateable(&existing, req.customer_id)?;
    lifecycle::validate_rating(req.rating)?;

    let rated = appointment::rate_appointment(pool, appointment_id, req.rating, req.note.as_deref())
        .await
        .map_err(BookingError::Database)?;

    match rated {
        Some(row) => {
            tracing::info!(appointment_id = %appointment_id, rating = req.rating, "operator rated");
            row.into_domain().map_err(BookingError::Database)
        }
        None => Err(BookingError::State(
            "this appointment has already been rated".to_string(),
        )),
    }
}

pub async fn get(pool: &PgPool, appointment_id: Uuid) -> BookingResult<Appointment> {
    appointment::get_appointment_by_id(pool, appointment_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Appointment with ID {} not found", appointment_id))
        })?
        .into_domain()
        .map_err(BookingError::Database)
}

/// Appointments for one participant, customer or operator side.
pub async fn list_for_participant(
    pool: &PgPool,
    customer_id: Option<Uuid>,
    operator_id: Option<Uuid>,
    include_deleted: bool,
) -> BookingResult<Vec<Appointment>> {
    let rows = match (customer_id, operator_id) {
        (Some(customer_id), None) => {
            appointment::list_by_customer(pool, customer_id, include_deleted)
                .await
                .map_err(BookingError::Database)?
        }
        (None, Some(operator_id)) => {
            appointment::list_by_operator(pool, operator_id, include_deleted)
                .await
                .map_err(BookingError::Database)?
        }
        _ => {
            return Err(BookingError::Validation(
                "exactly one of customer_id or operator_id must be provided".to_string(),
            ));
        }
    };

    rows.into_iter()
        .map(|r| r.into_domain().map_err(BookingError::Database))
        .collect()
}

/// Every operator able to take the requested slot, in the directory's
/// stable order. An empty list is a legitimate answer.
pub async fn list_available_operators(
    pool: &PgPool,
    category_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    duration_minutes: i32,
) -> BookingResult<Vec<Uuid>> {
    let (end_time, _) = lifecycle::resolve_slot_end(start_time, None, Some(duration_minutes))?;
    let day = DayOfWeek::of(date);

    let capable = directory::get_capable_operators(pool, category_id)
        .await
        .map_err(BookingError::Database)?;

    let mut candidates = Vec::with_capacity(capable.len());
    for operator_id in capable {
        candidates.push(load_candidate(pool, operator_id, date).await?);
    }

    Ok(matcher::find_all(&candidates, day, start_time, end_time))
}

/// Elapsed appointments the operator still owes an outcome for.
pub async fn pending_completion(
    pool: &PgPool,
    operator_id: Uuid,
    now: NaiveDateTime,
) -> BookingResult<Vec<Appointment>> {
    appointment::find_pending_completion(pool, operator_id, now.date(), now.time())
        .await
        .map_err(BookingError::Database)?
        .into_iter()
        .map(|r| r.into_domain().map_err(BookingError::Database))
        .collect()
}
