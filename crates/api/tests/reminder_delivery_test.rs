//! Delivery-decision tests for the reminder sweep, exercised the same way
//! the sweep consumes the repositories: a due-task scan followed by the
//! per-task preference gating, dispatch, and guarded mark-sent. Repository
//! calls are mocked; the dispatcher records every handoff.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use mockall::predicate;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use slotbook_api::services::notify::ReminderDispatcher;
use slotbook_core::models::{
    Appointment, AppointmentStatus, AttendanceStatus, NotificationPreference, ReminderKind,
    ReminderTask,
};
use slotbook_db::mock::repositories::MockReminderRepo;
use slotbook_db::models::DbReminderTask;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn at(d: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    d.and_hms_opt(h, m, 0).unwrap()
}

fn scheduled_appointment() -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        operator_id: Some(Uuid::new_v4()),
        category_id: None,
        title: "Checkup".to_string(),
        description: None,
        date: date(2026, 8, 10),
        start_time: time(10, 0),
        end_time: time(10, 30),
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

fn due_db_task(appointment: &Appointment, kind: ReminderKind) -> DbReminderTask {
    DbReminderTask {
        id: Uuid::new_v4(),
        user_id: appointment.customer_id,
        appointment_id: appointment.id,
        kind: kind.as_str().to_string(),
        fires_at: at(date(2026, 8, 10), 9, 0),
        sent: false,
        created_at: Utc::now(),
    }
}

struct RecordingDispatcher {
    dispatched: AtomicU32,
    fail: bool,
}

impl RecordingDispatcher {
    fn new() -> Self {
        Self {
            dispatched: AtomicU32::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            dispatched: AtomicU32::new(0),
            fail: true,
        }
    }

    fn count(&self) -> u32 {
        self.dispatched.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReminderDispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        _recipient: Uuid,
        _kind: ReminderKind,
        _appointment: &Appointment,
    ) -> eyre::Result<()> {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(eyre::eyre!("transport unavailable"))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Delivered,
    Suppressed,
    Discarded,
    AlreadyConsumed,
}

/// The sweep's per-task decision, against mocked persistence: suppression
/// for terminal appointments and disabled kinds, dispatch before mark-sent,
/// dispatch failures never fatal, in-app-disabled tasks discarded.
async fn deliver_task(
    task: &ReminderTask,
    appointment: &Appointment,
    prefs: &NotificationPreference,
    repo: &MockReminderRepo,
    dispatcher: &dyn ReminderDispatcher,
) -> Outcome {
    if appointment.deleted || appointment.status.is_terminal() || !prefs.kind_enabled(task.kind) {
        return if repo.mark_sent(task.id).await.unwrap() {
            Outcome::Suppressed
        } else {
            Outcome::AlreadyConsumed
        };
    }

    if prefs.email_enabled {
        // Failure is logged by the real sweep and never aborts the task
        let _ = dispatcher
            .dispatch(task.user_id, task.kind, appointment)
            .await;
    }

    if prefs.in_app_enabled {
        if repo.mark_sent(task.id).await.unwrap() {
            Outcome::Delivered
        } else {
            Outcome::AlreadyConsumed
        }
    } else {
        repo.delete_task(task.id).await.unwrap();
        Outcome::Discarded
    }
}

async fn run_sweep_once(
    repo: &MockReminderRepo,
    appointment: &Appointment,
    prefs: &NotificationPreference,
    dispatcher: &dyn ReminderDispatcher,
    now: NaiveDateTime,
) -> Vec<Outcome> {
    let due = repo.find_due(now).await.unwrap();
    let mut outcomes = Vec::new();
    for row in due {
        let task = row.into_domain();
        outcomes.push(deliver_task(&task, appointment, prefs, repo, dispatcher).await);
    }
    outcomes
}

#[tokio::test]
async fn test_enabled_kind_dispatches_once_and_marks_sent() {
    let appointment = scheduled_appointment();
    let task = due_db_task(&appointment, ReminderKind::HoursBefore).into_domain();
    let prefs = NotificationPreference::default();
    let dispatcher = RecordingDispatcher::new();

    let mut repo = MockReminderRepo::new();
    repo.expect_mark_sent()
        .with(predicate::eq(task.id))
        .times(1)
        .returning(|_| Ok(true));

    let outcome = deliver_task(&task, &appointment, &prefs, &repo, &dispatcher).await;

    assert_eq!(outcome, Outcome::Delivered);
    assert_eq!(dispatcher.count(), 1);
}

#[tokio::test]
async fn test_disabled_kind_is_suppressed_without_dispatch() {
    let appointment = scheduled_appointment();
    let task = due_db_task(&appointment, ReminderKind::DayBefore).into_domain();
    let prefs = NotificationPreference {
        enabled_kinds: vec!["HOURS_BEFORE".to_string()],
        ..NotificationPreference::default()
    };
    let dispatcher = RecordingDispatcher::new();

    let mut repo = MockReminderRepo::new();
    // Marked sent so it is never re-examined, but nothing is dispatched
    repo.expect_mark_sent()
        .with(predicate::eq(task.id))
        .times(1)
        .returning(|_| Ok(true));

    let outcome = deliver_task(&task, &appointment, &prefs, &repo, &dispatcher).await;

    assert_eq!(outcome, Outcome::Suppressed);
    assert_eq!(dispatcher.count(), 0);
}

#[tokio::test]
async fn test_cancelled_appointment_suppresses_delivery() {
    let mut appointment = scheduled_appointment();
    appointment.status = AppointmentStatus::Cancelled;
    appointment.deleted = true;

    let task = due_db_task(&appointment, ReminderKind::HoursBefore).into_domain();
    let prefs = NotificationPreference::default();
    let dispatcher = RecordingDispatcher::new();

    let mut repo = MockReminderRepo::new();
    repo.expect_mark_sent().times(1).returning(|_| Ok(true));

    let outcome = deliver_task(&task, &appointment, &prefs, &repo, &dispatcher).await;

    assert_eq!(outcome, Outcome::Suppressed);
    assert_eq!(dispatcher.count(), 0);
}

#[tokio::test]
async fn test_dispatch_failure_does_not_block_consumption() {
    let appointment = scheduled_appointment();
    let task = due_db_task(&appointment, ReminderKind::HoursBefore).into_domain();
    let prefs = NotificationPreference::default();
    let dispatcher = RecordingDispatcher::failing();

    let mut repo = MockReminderRepo::new();
    repo.expect_mark_sent().times(1).returning(|_| Ok(true));

    let outcome = deliver_task(&task, &appointment, &prefs, &repo, &dispatcher).await;

    // The handoff failed, the task is still consumed; the failure is logged
    assert_eq!(outcome, Outcome::Delivered);
    assert_eq!(dispatcher.count(), 1);
}

#[tokio::test]
async fn test_in_app_disabled_discards_instead_of_marking() {
    let appointment = scheduled_appointment();
    let task = due_db_task(&appointment, ReminderKind::HoursBefore).into_domain();
    let prefs = NotificationPreference {
        in_app_enabled: false,
        ..NotificationPreference::default()
    };
    let dispatcher = RecordingDispatcher::new();

    let mut repo = MockReminderRepo::new();
    repo.expect_delete_task()
        .with(predicate::eq(task.id))
        .times(1)
        .returning(|_| Ok(()));
    repo.expect_mark_sent().never();

    let outcome = deliver_task(&task, &appointment, &prefs, &repo, &dispatcher).await;

    assert_eq!(outcome, Outcome::Discarded);
    assert_eq!(dispatcher.count(), 1);
}

#[tokio::test]
async fn test_two_sweeps_over_one_due_task_dispatch_at_most_once() {
    let appointment = scheduled_appointment();
    let db_task = due_db_task(&appointment, ReminderKind::HoursBefore);
    let prefs = NotificationPreference::default();
    let dispatcher = RecordingDispatcher::new();
    let now = at(date(2026, 8, 10), 9, 5);

    let mut repo = MockReminderRepo::new();
    // First scan surfaces the task; after mark-sent the second scan is empty
    let first_batch = vec![db_task.clone()];
    repo.expect_find_due()
        .times(1)
        .return_once(move |_| Ok(first_batch));
    repo.expect_mark_sent().times(1).returning(|_| Ok(true));
    repo.expect_find_due().times(1).returning(|_| Ok(vec![]));

    let first = run_sweep_once(&repo, &appointment, &prefs, &dispatcher, now).await;
    let second = run_sweep_once(&repo, &appointment, &prefs, &dispatcher, now).await;

    assert_eq!(first, vec![Outcome::Delivered]);
    assert!(second.is_empty());
    assert_eq!(dispatcher.count(), 1);
}

#[tokio::test]
async fn test_concurrent_mark_sent_consumes_exactly_once() {
    let appointment = scheduled_appointment();
    let task = due_db_task(&appointment, ReminderKind::HoursBefore).into_domain();
    let prefs = NotificationPreference {
        email_enabled: false,
        ..NotificationPreference::default()
    };
    let dispatcher = RecordingDispatcher::new();

    // The guarded update lets exactly one caller observe the consumption
    let mut repo = MockReminderRepo::new();
    let mut first = true;
    repo.expect_mark_sent().times(2).returning(move |_| {
        let won = first;
        first = false;
        Ok(won)
    });

    let a = deliver_task(&task, &appointment, &prefs, &repo, &dispatcher).await;
    let b = deliver_task(&task, &appointment, &prefs, &repo, &dispatcher).await;

    assert_eq!(a, Outcome::Delivered);
    assert_eq!(b, Outcome::AlreadyConsumed);
}
