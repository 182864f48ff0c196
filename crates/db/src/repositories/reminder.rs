use crate::models::DbReminderTask;
use chrono::{NaiveDateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Idempotent insert: the partial unique index on (appointment_id, kind)
/// over unsent rows turns a duplicate scheduling attempt into a no-op.
/// Returns None when an unsent task of this kind already exists.
pub async fn create_task(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    appointment_id: Uuid,
    kind: &str,
    fires_at: NaiveDateTime,
) -> Result<Option<DbReminderTask>> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let task = sqlx::query_as::<_, DbReminderTask>(
        r#"
        INSERT INTO reminder_tasks (id, user_id, appointment_id, kind, fires_at, sent, created_at)
        VALUES ($1, $2, $3, $4, $5, FALSE, $6)
        ON CONFLICT (appointment_id, kind) WHERE sent = FALSE DO NOTHING
        RETURNING id, user_id, appointment_id, kind, fires_at, sent, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(appointment_id)
    .bind(kind)
    .bind(fires_at)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    if task.is_some() {
        tracing::debug!(
            "Reminder task created: appointment={}, kind={}, fires_at={}",
            appointment_id,
            kind,
            fires_at
        );
    }

    Ok(task)
}

/// Retires unsent tasks ahead of rescheduling. Sent tasks are history and
/// stay untouched.
pub async fn delete_unsent_for_appointment(
    pool: &Pool<Postgres>,
    appointment_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM reminder_tasks
        WHERE appointment_id = $1 AND sent = FALSE
        "#,
    )
    .bind(appointment_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn find_due(pool: &Pool<Postgres>, now: NaiveDateTime) -> Result<Vec<DbReminderTask>> {
    let tasks = sqlx::query_as::<_, DbReminderTask>(
        r#"
        SELECT id, user_id, appointment_id, kind, fires_at, sent, created_at
        FROM reminder_tasks
        WHERE fires_at <= $1 AND sent = FALSE
        ORDER BY fires_at
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(tasks)
}

/// Consumes the task exactly once: the sent = FALSE guard means that of two
/// racing sweeps, only one observes rows_affected = 1.
pub async fn mark_sent(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE reminder_tasks
        SET sent = TRUE
        WHERE id = $1 AND sent = FALSE
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Used when the recipient has in-app notifications disabled: the task is
/// discarded rather than kept as unread history.
pub async fn delete_task(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM reminder_tasks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
