use chrono::NaiveDateTime;
use slotbook_core::errors::BookingError;
use slotbook_core::models::{Appointment, NotificationPreference};
use slotbook_core::scheduling::reminders;
use sqlx::PgPool;

use slotbook_db::repositories::{directory, reminder};

/// The recipient's live preferences, or the provisioning defaults when the
/// account has no stored row.
pub async fn load_preferences(
    pool: &PgPool,
    user_id: uuid::Uuid,
) -> Result<NotificationPreference, BookingError> {
    let prefs = directory::get_preferences(pool, user_id)
        .await
        .map_err(BookingError::Database)?
        .map(|p| p.into_domain())
        .unwrap_or_default();
    Ok(prefs)
}

/// Creates the reminder tasks for a freshly booked appointment: one per
/// enabled kind whose firing instant is still ahead of `now`. Insertion is
/// idempotent, so re-running for the same appointment never yields a second
/// unsent task of a kind.
pub async fn schedule_for_appointment(
    pool: &PgPool,
    appointment: &Appointment,
    now: NaiveDateTime,
) -> Result<u32, BookingError> {
    let prefs = load_preferences(pool, appointment.customer_id).await?;
    let times = reminders::reminder_times(appointment.date, appointment.start_time, &prefs, now);

    let mut created = 0;
    for (kind, fires_at) in times {
        let inserted = reminder::create_task(
            pool,
            appointment.customer_id,
            appointment.id,
            kind.as_str(),
            fires_at,
        )
        .await
        .map_err(BookingError::Database)?;
        if inserted.is_some() {
            created += 1;
        }
    }

    tracing::debug!(
        appointment_id = %appointment.id,
        created,
        "reminder tasks scheduled"
    );
    Ok(created)
}

/// Reschedule: retire every unsent task for the appointment, then re-create
/// from the updated slot. Sent tasks stay untouched as a historical record.
pub async fn reschedule_for_appointment(
    pool: &PgPool,
    appointment: &Appointment,
    now: NaiveDateTime,
) -> Result<u32, BookingError> {
    let retired = reminder::delete_unsent_for_appointment(pool, appointment.id)
        .await
        .map_err(BookingError::Database)?;
    tracing::debug!(
        appointment_id = %appointment.id,
        retired,
        "unsent reminder tasks retired"
    );

    schedule_for_appointment(pool, appointment, now).await
}

/// Cancellation cleanup: a cancelled appointment must not fire reminders.
pub async fn retire_for_appointment(pool: &PgPool, appointment_id: uuid::Uuid) -> Result<u64, BookingError> {
    reminder::delete_unsent_for_appointment(pool, appointment_id)
        .await
        .map_err(BookingError::Database)
}
