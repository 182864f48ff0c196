//! Booking, lifecycle, and reminder orchestration. Handlers stay thin; the
//! engine lives here, with the pure rules in `slotbook_core::scheduling` and
//! persistence in `slotbook_db::repositories`.

pub mod booking;
pub mod locks;
pub mod notify;
pub mod reminders;
pub mod sweeps;
