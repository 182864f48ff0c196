use async_trait::async_trait;
use slotbook_core::models::{Appointment, ReminderKind};
use uuid::Uuid;

/// Seam to the delivery collaborator. The core decides *what* and *when* to
/// notify; rendering and transport happen on the other side of this trait.
/// Dispatch is fire-and-forget: a failure is logged by the caller and never
/// aborts a booking or lifecycle commit.
#[async_trait]
pub trait ReminderDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        recipient: Uuid,
        kind: ReminderKind,
        appointment: &Appointment,
    ) -> eyre::Result<()>;
}

/// Default dispatcher: records the handoff in the log stream. Deployments
/// wire a real transport here.
pub struct LogDispatcher;

#[async_trait]
impl ReminderDispatcher for LogDispatcher {
    async fn dispatch(
        &self,
        recipient: Uuid,
        kind: ReminderKind,
        appointment: &Appointment,
    ) -> eyre::Result<()> {
        tracing::info!(
            %recipient,
            %kind,
            appointment_id = %appointment.id,
            date = %appointment.date,
            start_time = %appointment.start_time,
            "reminder dispatched"
        );
        Ok(())
    }
}
