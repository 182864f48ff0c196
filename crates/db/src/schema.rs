use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create availability_windows table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availability_windows (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            operator_id UUID NOT NULL,
            day_of_week VARCHAR(10) NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_window_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            customer_id UUID NOT NULL,
            operator_id UUID NULL,
            category_id UUID NULL,
            title VARCHAR(200) NOT NULL,
            description TEXT NULL,
            date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            duration_minutes INTEGER NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'SCHEDULED',
            attendance_status VARCHAR(20) NOT NULL DEFAULT 'PENDING',
            operator_note TEXT NULL,
            operator_rating INTEGER NULL,
            customer_note TEXT NULL,
            customer_rating INTEGER NULL,
            completed_by_operator BOOLEAN NOT NULL DEFAULT FALSE,
            completed_at TIMESTAMP NULL,
            deleted BOOLEAN NOT NULL DEFAULT FALSE,
            deleted_at TIMESTAMP NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create reminder_tasks table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reminder_tasks (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL,
            appointment_id UUID NOT NULL REFERENCES appointments(id),
            kind VARCHAR(20) NOT NULL,
            fires_at TIMESTAMP NOT NULL,
            sent BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // At most one unsent task per appointment and kind; sent tasks stay as history
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_reminder_tasks_unsent
        ON reminder_tasks(appointment_id, kind) WHERE sent = FALSE;
        "#,
    )
    .execute(pool)
    .await?;

    // Directory tables, seeded by the account system and read-only to the core
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS operator_capabilities (
            operator_id UUID NOT NULL,
            category_id UUID NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            PRIMARY KEY (operator_id, category_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS account_roles (
            user_id UUID PRIMARY KEY,
            role VARCHAR(20) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notification_preferences (
            user_id UUID PRIMARY KEY,
            reminder_offset_hours INTEGER NOT NULL DEFAULT 1,
            email_enabled BOOLEAN NOT NULL DEFAULT TRUE,
            in_app_enabled BOOLEAN NOT NULL DEFAULT TRUE,
            day_before_enabled BOOLEAN NOT NULL DEFAULT TRUE,
            hours_before_enabled BOOLEAN NOT NULL DEFAULT TRUE,
            enabled_kinds TEXT[] NOT NULL DEFAULT ARRAY['DAY_BEFORE', 'HOURS_BEFORE'],
            CONSTRAINT valid_offset CHECK (reminder_offset_hours BETWEEN 1 AND 6)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_availability_windows_operator ON availability_windows(operator_id);
        CREATE INDEX IF NOT EXISTS idx_availability_windows_operator_day ON availability_windows(operator_id, day_of_week);
        CREATE INDEX IF NOT EXISTS idx_appointments_operator_date ON appointments(operator_id, date);
        CREATE INDEX IF NOT EXISTS idx_appointments_customer ON appointments(customer_id);
        CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status);
        CREATE INDEX IF NOT EXISTS idx_reminder_tasks_fires_at ON reminder_tasks(fires_at);
        CREATE INDEX IF NOT EXISTS idx_reminder_tasks_appointment ON reminder_tasks(appointment_id);
        CREATE INDEX IF NOT EXISTS idx_operator_capabilities_category ON operator_capabilities(category_id);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
