use crate::models::DbAppointment;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = "id, customer_id, operator_id, category_id, title, description, \
     date, start_time, end_time, duration_minutes, status, attendance_status, \
     operator_note, operator_rating, customer_note, customer_rating, \
     completed_by_operator, completed_at, deleted, deleted_at, created_at, updated_at";

/// Fields of a validated booking about to be committed. The operator is
/// always resolved before commit, so it is not optional here.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub customer_id: Uuid,
    pub operator_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
}

/// Result of a guarded write against the (operator, date) partition.
#[derive(Debug)]
pub enum BookOutcome {
    Booked(DbAppointment),
    /// Overlap detected inside the transaction, or the partition lock could
    /// not be acquired promptly. Retryable with a different slot.
    Conflict,
}

/// Serializes all writes touching one (operator, date) partition. Uses a
/// transaction-scoped advisory lock keyed by a stable hash of the partition,
/// so concurrent bookings for the same operator and date queue up while
/// unrelated partitions proceed untouched. A bounded lock_timeout keeps a
/// contended partition from hanging the request.
async fn lock_partition(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: Uuid,
    date: NaiveDate,
) -> Result<bool> {
    sqlx::query("SET LOCAL lock_timeout = '2s'")
        .execute(&mut **tx)
        .await?;

    let locked = sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1 || ':' || $2, 0))")
        .bind(operator_id.to_string())
        .bind(date.to_string())
        .execute(&mut **tx)
        .await;

    match locked {
        Ok(_) => Ok(true),
        // 55P03 lock_not_available: partition contended past the timeout
        Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("55P03") => {
            tracing::debug!("partition lock timed out: operator={}, date={}", operator_id, date);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn count_overlapping(
    tx: &mut Transaction<'_, Postgres>,
    operator_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    exclude_id: Option<Uuid>,
) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM appointments
        WHERE operator_id = $1 AND date = $2 AND deleted = FALSE
          AND status NOT IN ('CANCELLED', 'FAILED')
          AND start_time < $4 AND end_time > $3
          AND ($5::uuid IS NULL OR id != $5)
        "#,
    )
    .bind(operator_id)
    .bind(date)
    .bind(start_time)
    .bind(end_time)
    .bind(exclude_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(count)
}

/// Check-then-insert as one atomic unit per (operator, date) partition: the
/// overlap count runs inside the transaction that holds the partition lock,
/// so two concurrent requests for the same slot cannot both pass.
pub async fn book_guarded(pool: &Pool<Postgres>, new: NewAppointment) -> Result<BookOutcome> {
    let mut tx = pool.begin().await?;

    if !lock_partition(&mut tx, new.operator_id, new.date).await? {
        return Ok(BookOutcome::Conflict);
    }

    let overlapping = count_overlapping(
        &mut tx,
        new.operator_id,
        new.date,
        new.start_time,
        new.end_time,
        None,
    )
    .await?;
    if overlapping > 0 {
        tx.rollback().await?;
        return Ok(BookOutcome::Conflict);
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments
            (id, customer_id, operator_id, category_id, title, description,
             date, start_time, end_time, duration_minutes, status, attendance_status,
             completed_by_operator, deleted, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'SCHEDULED', 'PENDING',
                FALSE, FALSE, $11, $11)
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(new.customer_id)
    .bind(new.operator_id)
    .bind(new.category_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.date)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(new.duration_minutes)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!("Appointment booked: id={}, operator={}", id, new.operator_id);
    Ok(BookOutcome::Booked(appointment))
}

/// Slot edit under the same partition discipline as booking. The
/// appointment's own row is excluded from the overlap count.
pub async fn reschedule_guarded(
    pool: &Pool<Postgres>,
    id: Uuid,
    operator_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    duration_minutes: i32,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<BookOutcome> {
    let mut tx = pool.begin().await?;

    if !lock_partition(&mut tx, operator_id, date).await? {
        return Ok(BookOutcome::Conflict);
    }

    let overlapping =
        count_overlapping(&mut tx, operator_id, date, start_time, end_time, Some(id)).await?;
    if overlapping > 0 {
        tx.rollback().await?;
        return Ok(BookOutcome::Conflict);
    }

    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET date = $2, start_time = $3, end_time = $4, duration_minutes = $5,
            title = COALESCE($6, title), description = COALESCE($7, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(date)
    .bind(start_time)
    .bind(end_time)
    .bind(duration_minutes)
    .bind(title)
    .bind(description)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!("Appointment rescheduled: id={}", id);
    Ok(BookOutcome::Booked(appointment))
}

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// The operator's ledger for one date: every non-deleted row, regardless of
/// status. The conflict predicate decides which entries block.
pub async fn list_by_operator_date(
    pool: &Pool<Postgres>,
    operator_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE operator_id = $1 AND date = $2 AND deleted = FALSE
        ORDER BY start_time
        "#
    ))
    .bind(operator_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn list_by_customer(
    pool: &Pool<Postgres>,
    customer_id: Uuid,
    include_deleted: bool,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE customer_id = $1 AND ($2 = TRUE OR deleted = FALSE)
        ORDER BY date, start_time
        "#
    ))
    .bind(customer_id)
    .bind(include_deleted)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn list_by_operator(
    pool: &Pool<Postgres>,
    operator_id: Uuid,
    include_deleted: bool,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE operator_id = $1 AND ($2 = TRUE OR deleted = FALSE)
        ORDER BY date, start_time
        "#
    ))
    .bind(operator_id)
    .bind(include_deleted)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Candidates for the auto-complete sweep: active appointments whose window
/// fully elapsed before `time` on `date`.
pub async fn find_to_complete(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE deleted = FALSE
          AND status IN ('SCHEDULED', 'IN_PROGRESS')
          AND (date < $1 OR (date = $1 AND end_time < $2))
        "#
    ))
    .bind(date)
    .bind(time)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Candidates for the auto-progress sweep: scheduled appointments currently
/// inside their window.
pub async fn find_to_start(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE deleted = FALSE
          AND status = 'SCHEDULED'
          AND date = $1 AND start_time <= $2 AND end_time >= $2
        "#
    ))
    .bind(date)
    .bind(time)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Guarded forward move: only fires if the row is still SCHEDULED, so a
/// sweep re-running over an already-promoted appointment is a no-op.
pub async fn mark_in_progress(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE appointments
        SET status = 'IN_PROGRESS', updated_at = NOW()
        WHERE id = $1 AND status = 'SCHEDULED' AND deleted = FALSE
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Guarded forward move for the auto-complete sweep. Attendance is left
/// untouched; only the operator's complete action records it.
pub async fn mark_completed_by_sweep(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE appointments
        SET status = 'COMPLETED', updated_at = NOW()
        WHERE id = $1 AND status IN ('SCHEDULED', 'IN_PROGRESS') AND deleted = FALSE
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn complete_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
    attendance_status: &str,
    note: Option<&str>,
    rating: Option<i32>,
    completed_at: NaiveDateTime,
) -> Result<DbAppointment> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = $2, attendance_status = $3, operator_note = $4,
            operator_rating = $5, completed_by_operator = TRUE, completed_at = $6,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status)
    .bind(attendance_status)
    .bind(note)
    .bind(rating)
    .bind(completed_at)
    .fetch_one(pool)
    .await?;

    Ok(appointment)
}

/// One-time write: the guard on customer_rating makes a concurrent second
/// rating lose rather than overwrite.
pub async fn rate_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    rating: i32,
    note: Option<&str>,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET customer_rating = $2, customer_note = $3, updated_at = NOW()
        WHERE id = $1 AND customer_rating IS NULL
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(rating)
    .bind(note)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Cancellation is a soft delete plus the terminal status; the row is kept.
pub async fn cancel_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    deleted_at: NaiveDateTime,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET deleted = TRUE, deleted_at = $2, status = 'CANCELLED', updated_at = NOW()
        WHERE id = $1 AND status = 'SCHEDULED' AND deleted = FALSE
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(deleted_at)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

/// Elapsed appointments the operator has not yet recorded an outcome for,
/// newest first.
pub async fn find_pending_completion(
    pool: &Pool<Postgres>,
    operator_id: Uuid,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE operator_id = $1
          AND status IN ('SCHEDULED', 'IN_PROGRESS')
          AND (date < $2 OR (date = $2 AND end_time <= $3))
          AND completed_by_operator = FALSE
          AND deleted = FALSE
        ORDER BY date DESC, end_time DESC
        "#
    ))
    .bind(operator_id)
    .bind(date)
    .bind(time)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}
