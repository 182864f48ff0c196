//! Read-only access to the account directory: operator capabilities,
//! account roles, and notification preferences. These tables are seeded by
//! the account system; the core never writes them.

use crate::models::DbNotificationPreference;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Operators capable of serving a category, in registration order. The
/// matcher's first-fit policy depends on this order being stable.
pub async fn get_capable_operators(
    pool: &Pool<Postgres>,
    category_id: Uuid,
) -> Result<Vec<Uuid>> {
    let operators = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT operator_id
        FROM operator_capabilities
        WHERE category_id = $1
        ORDER BY created_at, operator_id
        "#,
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;

    Ok(operators)
}

pub async fn is_capable(
    pool: &Pool<Postgres>,
    operator_id: Uuid,
    category_id: Uuid,
) -> Result<bool> {
    let capable = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM operator_capabilities
            WHERE operator_id = $1 AND category_id = $2
        )
        "#,
    )
    .bind(operator_id)
    .bind(category_id)
    .fetch_one(pool)
    .await?;

    Ok(capable)
}

pub async fn get_role(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Option<String>> {
    let role = sqlx::query_scalar::<_, String>(
        r#"
        SELECT role FROM account_roles
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(role)
}

/// Accounts without a stored row resolve to the provisioning defaults at
/// the call site.
pub async fn get_preferences(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Option<DbNotificationPreference>> {
    let prefs = sqlx::query_as::<_, DbNotificationPreference>(
        r#"
        SELECT user_id, reminder_offset_hours, email_enabled, in_app_enabled,
               day_before_enabled, hours_before_enabled, enabled_kinds
        FROM notification_preferences
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(prefs)
}
