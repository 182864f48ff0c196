use crate::models::DbAvailabilityWindow;
use chrono::{NaiveTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_window(
    pool: &Pool<Postgres>,
    operator_id: Uuid,
    day_of_week: &str,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<DbAvailabilityWindow> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating availability window: operator={}, day={}, {} - {}",
        operator_id,
        day_of_week,
        start_time,
        end_time
    );

    let window = sqlx::query_as::<_, DbAvailabilityWindow>(
        r#"
        INSERT INTO availability_windows (id, operator_id, day_of_week, start_time, end_time, active, created_at)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6)
        RETURNING id, operator_id, day_of_week, start_time, end_time, active, created_at
        "#,
    )
    .bind(id)
    .bind(operator_id)
    .bind(day_of_week)
    .bind(start_time)
    .bind(end_time)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(window)
}

pub async fn get_window_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAvailabilityWindow>> {
    let window = sqlx::query_as::<_, DbAvailabilityWindow>(
        r#"
        SELECT id, operator_id, day_of_week, start_time, end_time, active, created_at
        FROM availability_windows
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(window)
}

pub async fn list_windows_by_operator(
    pool: &Pool<Postgres>,
    operator_id: Uuid,
) -> Result<Vec<DbAvailabilityWindow>> {
    let windows = sqlx::query_as::<_, DbAvailabilityWindow>(
        r#"
        SELECT id, operator_id, day_of_week, start_time, end_time, active, created_at
        FROM availability_windows
        WHERE operator_id = $1
        ORDER BY day_of_week, start_time
        "#,
    )
    .bind(operator_id)
    .fetch_all(pool)
    .await?;

    Ok(windows)
}

pub async fn list_active_windows_by_operator(
    pool: &Pool<Postgres>,
    operator_id: Uuid,
) -> Result<Vec<DbAvailabilityWindow>> {
    let windows = sqlx::query_as::<_, DbAvailabilityWindow>(
        r#"
        SELECT id, operator_id, day_of_week, start_time, end_time, active, created_at
        FROM availability_windows
        WHERE operator_id = $1 AND active = TRUE
        ORDER BY day_of_week, start_time
        "#,
    )
    .bind(operator_id)
    .fetch_all(pool)
    .await?;

    Ok(windows)
}

pub async fn update_window(
    pool: &Pool<Postgres>,
    id: Uuid,
    day_of_week: &str,
    start_time: NaiveTime,
    end_time: NaiveTime,
    active: bool,
) -> Result<DbAvailabilityWindow> {
    let window = sqlx::query_as::<_, DbAvailabilityWindow>(
        r#"
        UPDATE availability_windows
        SET day_of_week = $2, start_time = $3, end_time = $4, active = $5
        WHERE id = $1
        RETURNING id, operator_id, day_of_week, start_time, end_time, active, created_at
        "#,
    )
    .bind(id)
    .bind(day_of_week)
    .bind(start_time)
    .bind(end_time)
    .bind(active)
    .fetch_one(pool)
    .await?;

    Ok(window)
}

/// Soft-deactivate: windows referenced by past appointments are never
/// hard-deleted.
pub async fn deactivate_window(pool: &Pool<Postgres>, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE availability_windows
        SET active = FALSE
        WHERE id = $1 AND active = TRUE
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
