use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use slotbook_core::models::{
    Appointment, AppointmentStatus, AttendanceStatus, AvailabilityWindow, DayOfWeek,
    NotificationPreference, ReminderKind, ReminderTask,
};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub operator_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub status: String,
    pub attendance_status: String,
    pub operator_note: Option<String>,
    pub operator_rating: Option<i32>,
    pub customer_note: Option<String>,
    pub customer_rating: Option<i32>,
    pub completed_by_operator: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub deleted: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbAppointment {
    /// Status columns are stored as text; an unknown value is a corrupt row
    /// and surfaces as an error rather than a silent default.
    pub fn into_domain(self) -> eyre::Result<Appointment> {
        let status = AppointmentStatus::parse(&self.status)
            .ok_or_else(|| eyre!("unknown appointment status '{}'", self.status))?;
        let attendance_status = AttendanceStatus::parse(&self.attendance_status)
            .ok_or_else(|| eyre!("unknown attendance status '{}'", self.attendance_status))?;

        Ok(Appointment {
            id: self.id,
            customer_id: self.customer_id,
            operator_id: self.operator_id,
            category_id: self.category_id,
            title: self.title,
            description: self.description,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_minutes: self.duration_minutes,
            status,
            attendance_status,
            operator_note: self.operator_note,
            operator_rating: self.operator_rating,
            customer_note: self.customer_note,
            customer_rating: self.customer_rating,
            completed_by_operator: self.completed_by_operator,
            completed_at: self.completed_at,
            deleted: self.deleted,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAvailabilityWindow {
    pub id: Uuid,
    pub operator_id: Uuid,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl DbAvailabilityWindow {
    pub fn into_domain(self) -> eyre::Result<AvailabilityWindow> {
        let day_of_week = DayOfWeek::parse(&self.day_of_week)
            .ok_or_else(|| eyre!("unknown day of week '{}'", self.day_of_week))?;

        Ok(AvailabilityWindow {
            id: self.id,
            operator_id: self.operator_id,
            day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReminderTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub appointment_id: Uuid,
    pub kind: String,
    pub fires_at: NaiveDateTime,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
}

impl DbReminderTask {
    pub fn into_domain(self) -> ReminderTask {
        ReminderTask {
            id: self.id,
            user_id: self.user_id,
            appointment_id: self.appointment_id,
            // kind parsing falls back on unrecognized values, see ReminderKind::parse
            kind: ReminderKind::parse(&self.kind),
            fires_at: self.fires_at,
            sent: self.sent,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNotificationPreference {
    pub user_id: Uuid,
    pub reminder_offset_hours: i32,
    pub email_enabled: bool,
    pub in_app_enabled: bool,
    pub day_before_enabled: bool,
    pub hours_before_enabled: bool,
    pub enabled_kinds: Vec<String>,
}

impl DbNotificationPreference {
    pub fn into_domain(self) -> NotificationPreference {
        NotificationPreference {
            reminder_offset_hours: self.reminder_offset_hours,
            email_enabled: self.email_enabled,
            in_app_enabled: self.in_app_enabled,
            day_before_enabled: self.day_before_enabled,
            hours_before_enabled: self.hours_before_enabled,
            enabled_kinds: self.enabled_kinds,
        }
    }
}
