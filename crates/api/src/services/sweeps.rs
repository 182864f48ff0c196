use std::sync::Arc;

use chrono::NaiveDateTime;
use sqlx::PgPool;
use tokio::sync::Mutex;

use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::scheduling::lifecycle::{self, SweepTransition};
use slotbook_db::repositories::{appointment, reminder};

use crate::services::notify::ReminderDispatcher;
use crate::services::reminders;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSweepStats {
    pub started: u32,
    pub completed: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSweepStats {
    pub delivered: u32,
    pub suppressed: u32,
    pub discarded: u32,
    pub dispatch_failures: u32,
    /// True when the run was skipped because another sweep held the gate.
    pub skipped: bool,
}

/// Owns the sweep entry points and the single-flight gate for reminder
/// delivery. Driven by the server binary's interval timers; both sweeps are
/// functions of a supplied `now` and are safe to re-invoke.
pub struct Sweeper {
    pool: PgPool,
    dispatcher: Arc<dyn ReminderDispatcher>,
    reminder_gate: Mutex<()>,
}

impl Sweeper {
    pub fn new(pool: PgPool, dispatcher: Arc<dyn ReminderDispatcher>) -> Self {
        Self {
            pool,
            dispatcher,
            reminder_gate: Mutex::new(()),
        }
    }

    /// Auto-progress and auto-complete in one pass. Each candidate row is
    /// re-judged by the pure transition rule and applied with a guarded
    /// update, so a concurrent transition or a re-run is a no-op, and no
    /// appointment ever moves backward.
    pub async fn run_lifecycle_sweep(&self, now: NaiveDateTime) -> BookingResult<LifecycleSweepStats> {
        let mut stats = LifecycleSweepStats::default();

        let to_start = appointment::find_to_start(&self.pool, now.date(), now.time())
            .await
            .map_err(BookingError::Database)?;
        for row in to_start {
            let appt = row.into_domain().map_err(BookingError::Database)?;
            if lifecycle::sweep_transition(&appt, now) != Some(SweepTransition::Start) {
                continue;
            }
            if appointment::mark_in_progress(&self.pool, appt.id)
                .await
                .map_err(BookingError::Database)?
            {
                tracing::debug!(appointment_id = %appt.id, "appointment moved to IN_PROGRESS");
                stats.started += 1;
            }
        }

        let to_complete = appointment::find_to_complete(&self.pool, now.date(), now.time())
            .await
            .map_err(BookingError::Database)?;
        for row in to_complete {
            let appt = row.into_domain().map_err(BookingError::Database)?;
            if lifecycle::sweep_transition(&appt, now) != Some(SweepTransition::Complete) {
                continue;
            }
            if appointment::mark_completed_by_sweep(&self.pool, appt.id)
                .await
                .map_err(BookingError::Database)?
            {
                tracing::debug!(appointment_id = %appt.id, "appointment auto-completed");
                stats.completed += 1;
            }
        }

        if stats.started > 0 || stats.completed > 0 {
            tracing::info!(
                started = stats.started,
                completed = stats.completed,
                "lifecycle sweep applied transitions"
            );
        }
        Ok(stats)
    }

    /// Delivers every due, unsent reminder task once. Single-flight: an
    /// invocation that finds another sweep still running skips instead of
    /// overlapping it. Per task, the recipient's live preferences decide:
    /// kind disabled means mark sent without dispatching; email enabled
    /// means hand off to the dispatcher (failures logged, never fatal);
    /// in-app disabled means the task is discarded instead of marked.
    /// Dispatch precedes mark-sent, so a crash in between can re-deliver
    /// but never lose a reminder.
    pub async fn run_reminder_sweep(&self, now: NaiveDateTime) -> BookingResult<ReminderSweepStats> {
        let Ok(_guard) = self.reminder_gate.try_lock() else {
            tracing::debug!("reminder sweep already running, skipping this tick");
            return Ok(ReminderSweepStats {
                skipped: true,
                ..ReminderSweepStats::default()
            });
        };

        let mut stats = ReminderSweepStats::default();

        let due = reminder::find_due(&self.pool, now)
            .await
            .map_err(BookingError::Database)?;
        if due.is_empty() {
            return Ok(stats);
        }
        tracing::debug!(count = due.len(), "processing due reminder tasks");

        for row in due {
            let task = row.into_domain();

            let appointment =
                match appointment::get_appointment_by_id(&self.pool, task.appointment_id)
                    .await
                    .map_err(BookingError::Database)?
                {
                    Some(row) => row.into_domain().map_err(BookingError::Database)?,
                    None => {
                        // Dangling weak reference: the task has nothing to announce
                        reminder::delete_task(&self.pool, task.id)
                            .await
                            .map_err(BookingError::Database)?;
                        stats.discarded += 1;
                        continue;
                    }
                };

            let prefs = reminders::load_preferences(&self.pool, task.user_id).await?;

            // A cancelled appointment or a since-disabled kind suppresses the
            // reminder: consumed without dispatch, never re-delivered
            if appointment.deleted
                || appointment.status.is_terminal()
                || !prefs.kind_enabled(task.kind)
            {
                if reminder::mark_sent(&self.pool, task.id)
                    .await
                    .map_err(BookingError::Database)?
                {
                    stats.suppressed += 1;
                }
                continue;
            }

            if prefs.email_enabled {
                if let Err(e) = self
                    .dispatcher
                    .dispatch(task.user_id, task.kind, &appointment)
                    .await
                {
                    tracing::warn!(
                        task_id = %task.id,
                        user_id = %task.user_id,
                        "reminder dispatch failed: {e}"
                    );
                    stats.dispatch_failures += 1;
                }
            }

            if prefs.in_app_enabled {
                if reminder::mark_sent(&self.pool, task.id)
                    .await
                    .map_err(BookingError::Database)?
                {
                    stats.delivered += 1;
                }
            } else {
                reminder::delete_task(&self.pool, task.id)
                    .await
                    .map_err(BookingError::Database)?;
                stats.discarded += 1;
            }
        }

        tracing::info!(
            delivered = stats.delivered,
            suppressed = stats.suppressed,
            discarded = stats.discarded,
            dispatch_failures = stats.dispatch_failures,
            "reminder sweep finished"
        );
        Ok(stats)
    }
}

/// Spawns the interval timers that drive the sweeps. Each sweep runs on its
/// own cadence; a tick that fails logs and waits for the next one.
pub fn spawn_sweeps(sweeper: Arc<Sweeper>, lifecycle_interval_secs: u64, reminder_interval_secs: u64) {
    let lifecycle_sweeper = Arc::clone(&sweeper);
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(lifecycle_interval_secs));
        loop {
            ticker.tick().await;
            let now = chrono::Local::now().naive_local();
            if let Err(e) = lifecycle_sweeper.run_lifecycle_sweep(now).await {
                tracing::error!("lifecycle sweep failed: {e}");
            }
        }
    });

    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(reminder_interval_secs));
        loop {
            ticker.tick().await;
            let now = chrono::Local::now().naive_local();
            if let Err(e) = sweeper.run_reminder_sweep(now).await {
                tracing::error!("reminder sweep failed: {e}");
            }
        }
    });
}
