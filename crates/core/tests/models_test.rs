use chrono::{NaiveDate, NaiveTime, Utc};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use pretty_assertions::assert_eq;
use serde_json::{from_str, to_string};
use slotbook_core::models::{
    Appointment, AppointmentStatus, AttendanceStatus, AvailabilityWindow, DayOfWeek,
    NotificationPreference, ReminderKind, ReminderTask, Role,
};
use uuid::Uuid;

fn sample_appointment() -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        operator_id: Some(Uuid::new_v4()),
        category_id: Some(Uuid::new_v4()),
        title: Sentence(1..4).fake(),
        description: None,
        date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        duration_minutes: 30,
        status: AppointmentStatus::Scheduled,
        attendance_status: AttendanceStatus::Pending,
        operator_note: None,
        operator_rating: None,
        customer_note: None,
        customer_rating: None,
        completed_by_operator: false,
        completed_at: None,
        deleted: false,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_appointment_serialization() {
    let appointment = sample_appointment();

    let json = to_string(&appointment).expect("Failed to serialize appointment");
    let deserialized: Appointment = from_str(&json).expect("Failed to deserialize appointment");

    assert_eq!(deserialized.id, appointment.id);
    assert_eq!(deserialized.customer_id, appointment.customer_id);
    assert_eq!(deserialized.operator_id, appointment.operator_id);
    assert_eq!(deserialized.date, appointment.date);
    assert_eq!(deserialized.start_time, appointment.start_time);
    assert_eq!(deserialized.end_time, appointment.end_time);
    assert_eq!(deserialized.status, appointment.status);
    assert_eq!(deserialized.attendance_status, appointment.attendance_status);
}

#[test]
fn test_status_wire_format_is_screaming_snake_case() {
    let json = to_string(&AppointmentStatus::InProgress).unwrap();
    assert_eq!(json, "\"IN_PROGRESS\"");

    let json = to_string(&AttendanceStatus::NotAttended).unwrap();
    assert_eq!(json, "\"NOT_ATTENDED\"");

    let parsed: AppointmentStatus = from_str("\"CANCELLED\"").unwrap();
    assert_eq!(parsed, AppointmentStatus::Cancelled);
}

#[test]
fn test_status_round_trip_through_storage_strings() {
    for status in [
        AppointmentStatus::Scheduled,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Failed,
    ] {
        assert_eq!(AppointmentStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(AppointmentStatus::parse("PENDIENTE"), None);

    for attendance in [
        AttendanceStatus::Pending,
        AttendanceStatus::Attended,
        AttendanceStatus::NotAttended,
    ] {
        assert_eq!(AttendanceStatus::parse(attendance.as_str()), Some(attendance));
    }
}

#[test]
fn test_terminal_statuses() {
    assert!(!AppointmentStatus::Scheduled.is_terminal());
    assert!(!AppointmentStatus::InProgress.is_terminal());
    assert!(AppointmentStatus::Completed.is_terminal());
    assert!(AppointmentStatus::Cancelled.is_terminal());
    assert!(AppointmentStatus::Failed.is_terminal());
}

#[test]
fn test_day_of_week_from_date() {
    // 2026-08-10 is a Monday
    let monday = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
    assert_eq!(DayOfWeek::of(monday), DayOfWeek::Monday);

    let sunday = NaiveDate::from_ymd_opt(2026, 8, 16).unwrap();
    assert_eq!(DayOfWeek::of(sunday), DayOfWeek::Sunday);

    assert_eq!(DayOfWeek::parse("WEDNESDAY"), Some(DayOfWeek::Wednesday));
    assert_eq!(DayOfWeek::parse("wednesday"), None);
    assert_eq!(DayOfWeek::Saturday.as_str(), "SATURDAY");
}

#[test]
fn test_availability_window_serialization() {
    let window = AvailabilityWindow {
        id: Uuid::new_v4(),
        operator_id: Uuid::new_v4(),
        day_of_week: DayOfWeek::Monday,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        active: true,
        created_at: Utc::now(),
    };

    let json = to_string(&window).expect("Failed to serialize window");
    assert!(json.contains("\"MONDAY\""));
    let deserialized: AvailabilityWindow = from_str(&json).expect("Failed to deserialize window");

    assert_eq!(deserialized.id, window.id);
    assert_eq!(deserialized.day_of_week, window.day_of_week);
    assert_eq!(deserialized.start_time, window.start_time);
    assert_eq!(deserialized.active, window.active);
}

#[test]
fn test_reminder_task_serialization() {
    let task = ReminderTask {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        appointment_id: Uuid::new_v4(),
        kind: ReminderKind::HoursBefore,
        fires_at: NaiveDate::from_ymd_opt(2026, 8, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
        sent: false,
        created_at: Utc::now(),
    };

    let json = to_string(&task).expect("Failed to serialize reminder task");
    assert!(json.contains("\"HOURS_BEFORE\""));
    let deserialized: ReminderTask = from_str(&json).expect("Failed to deserialize reminder task");

    assert_eq!(deserialized.id, task.id);
    assert_eq!(deserialized.kind, task.kind);
    assert_eq!(deserialized.fires_at, task.fires_at);
    assert!(!deserialized.sent);
}

#[test]
fn test_reminder_kind_parse_falls_back_on_unknown() {
    assert_eq!(ReminderKind::parse("DAY_BEFORE"), ReminderKind::DayBefore);
    assert_eq!(ReminderKind::parse("HOURS_BEFORE"), ReminderKind::HoursBefore);
    // Legacy coercion: malformed kinds resolve to the generic day-before kind
    assert_eq!(ReminderKind::parse("REMINDER_WEEK"), ReminderKind::DayBefore);
    assert_eq!(ReminderKind::parse(""), ReminderKind::DayBefore);
}

#[test]
fn test_notification_preference_defaults() {
    let prefs = NotificationPreference::default();

    assert_eq!(prefs.reminder_offset_hours, 1);
    assert!(prefs.email_enabled);
    assert!(prefs.in_app_enabled);
    assert!(prefs.wants(ReminderKind::DayBefore));
    assert!(prefs.wants(ReminderKind::HoursBefore));
}

#[test]
fn test_notification_preference_gating() {
    let mut prefs = NotificationPreference::default();

    // Toggling the kind off gates scheduling even while the list still has it
    prefs.day_before_enabled = false;
    assert!(!prefs.wants(ReminderKind::DayBefore));
    assert!(prefs.kind_enabled(ReminderKind::DayBefore));

    // Removing the kind from the enabled list gates both sides
    prefs.enabled_kinds = vec!["HOURS_BEFORE".to_string()];
    assert!(!prefs.kind_enabled(ReminderKind::DayBefore));
    assert!(prefs.wants(ReminderKind::HoursBefore));
}

#[test]
fn test_role_parse() {
    assert_eq!(Role::parse("CUSTOMER"), Some(Role::Customer));
    assert_eq!(Role::parse("OPERATOR"), Some(Role::Operator));
    assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
    assert_eq!(Role::parse("SUPERUSER"), None);
}
