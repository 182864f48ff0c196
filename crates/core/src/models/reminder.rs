use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderKind {
    DayBefore,
    HoursBefore,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::DayBefore => "DAY_BEFORE",
            ReminderKind::HoursBefore => "HOURS_BEFORE",
        }
    }

    /// Parses a stored kind string. Unrecognized values fall back to
    /// DAY_BEFORE — legacy behavior carried over from the system this one
    /// replaces, where malformed kinds coerced to a generic kind instead of
    /// failing the row.
    pub fn parse(value: &str) -> Self {
        match value {
            "DAY_BEFORE" => ReminderKind::DayBefore,
            "HOURS_BEFORE" => ReminderKind::HoursBefore,
            other => {
                tracing::warn!("unrecognized reminder kind '{}', treating as DAY_BEFORE", other);
                ReminderKind::DayBefore
            }
        }
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled reminder for one participant of one appointment. References
/// the appointment by id only; retired (deleted) on reschedule while unsent,
/// kept as history once sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub appointment_id: Uuid,
    pub kind: ReminderKind,
    pub fires_at: NaiveDateTime,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-account notification settings, owned by the account collaborator and
/// read-only to the core. `enabled_kinds` holds the kind strings the user
/// has opted into; the per-kind booleans gate scheduling, the list gates
/// delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub reminder_offset_hours: i32,
    pub email_enabled: bool,
    pub in_app_enabled: bool,
    pub day_before_enabled: bool,
    pub hours_before_enabled: bool,
    pub enabled_kinds: Vec<String>,
}

impl Default for NotificationPreference {
    fn default() -> Self {
        Self {
            reminder_offset_hours: 1,
            email_enabled: true,
            in_app_enabled: true,
            day_before_enabled: true,
            hours_before_enabled: true,
            enabled_kinds: vec![
                ReminderKind::DayBefore.as_str().to_string(),
                ReminderKind::HoursBefore.as_str().to_string(),
            ],
        }
    }
}

impl NotificationPreference {
    /// Whether the user has the kind in their enabled list. Checked again at
    /// delivery time so a preference change after scheduling still wins.
    pub fn kind_enabled(&self, kind: ReminderKind) -> bool {
        self.enabled_kinds.iter().any(|k| k == kind.as_str())
    }

    /// Whether a task of this kind should be scheduled at all.
    pub fn wants(&self, kind: ReminderKind) -> bool {
        let toggled = match kind {
            ReminderKind::DayBefore => self.day_before_enabled,
            ReminderKind::HoursBefore => self.hours_before_enabled,
        };
        toggled && self.kind_enabled(kind)
    }
}
