use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use mockall::mock;
use uuid::Uuid;

use crate::models::{DbAppointment, DbAvailabilityWindow, DbNotificationPreference, DbReminderTask};
use crate::repositories::appointment::{BookOutcome, NewAppointment};

// Mock repositories for testing
mock! {
    pub AppointmentRepo {
        pub async fn book_guarded(&self, new: NewAppointment) -> eyre::Result<BookOutcome>;

        pub async fn get_appointment_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbAppointment>>;

        pub async fn list_by_operator_date(
            &self,
            operator_id: Uuid,
            date: NaiveDate,
        ) -> eyre::Result<Vec<DbAppointment>>;

        pub async fn find_to_complete(
            &self,
            date: NaiveDate,
            time: NaiveTime,
        ) -> eyre::Result<Vec<DbAppointment>>;

        pub async fn find_to_start(
            &self,
            date: NaiveDate,
            time: NaiveTime,
        ) -> eyre::Result<Vec<DbAppointment>>;

        pub async fn mark_in_progress(&self, id: Uuid) -> eyre::Result<bool>;

        pub async fn mark_completed_by_sweep(&self, id: Uuid) -> eyre::Result<bool>;

        pub async fn cancel_appointment(
            &self,
            id: Uuid,
            deleted_at: NaiveDateTime,
        ) -> eyre::Result<Option<DbAppointment>>;
    }
}

mock! {
    pub WindowRepo {
        pub async fn create_window(
            &self,
            operator_id: Uuid,
            day_of_week: &'static str,
            start_time: NaiveTime,
            end_time: NaiveTime,
        ) -> eyre::Result<DbAvailabilityWindow>;

        pub async fn get_window_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbAvailabilityWindow>>;

        pub async fn list_active_windows_by_operator(
            &self,
            operator_id: Uuid,
        ) -> eyre::Result<Vec<DbAvailabilityWindow>>;

        pub async fn deactivate_window(&self, id: Uuid) -> eyre::Result<bool>;
    }
}

mock! {
    pub ReminderRepo {
        pub async fn create_task(
            &self,
            user_id: Uuid,
            appointment_id: Uuid,
            kind: &'static str,
            fires_at: NaiveDateTime,
        ) -> eyre::Result<Option<DbReminderTask>>;

        pub async fn delete_unsent_for_appointment(
            &self,
            appointment_id: Uuid,
        ) -> eyre::Result<u64>;

        pub async fn find_due(&self, now: NaiveDateTime) -> eyre::Result<Vec<DbReminderTask>>;

        pub async fn mark_sent(&self, id: Uuid) -> eyre::Result<bool>;

        pub async fn delete_task(&self, id: Uuid) -> eyre::Result<()>;
    }
}

mock! {
    pub DirectoryRepo {
        pub async fn get_capable_operators(
            &self,
            category_id: Uuid,
        ) -> eyre::Result<Vec<Uuid>>;

        pub async fn is_capable(
            &self,
            operator_id: Uuid,
            category_id: Uuid,
        ) -> eyre::Result<bool>;

        pub async fn get_role(&self, user_id: Uuid) -> eyre::Result<Option<String>>;

        pub async fn get_preferences(
            &self,
            user_id: Uuid,
        ) -> eyre::Result<Option<DbNotificationPreference>>;
    }
}
