pub mod appointment;
pub mod availability;
pub mod reminder;

pub use appointment::{
    Appointment, AppointmentStatus, AttendanceStatus, BookAppointmentRequest,
    CancelAppointmentRequest, CompleteAppointmentRequest, RateAppointmentRequest,
    RescheduleAppointmentRequest, Role,
};
pub use availability::{AvailabilityWindow, CreateWindowRequest, DayOfWeek, UpdateWindowRequest};
pub use reminder::{NotificationPreference, ReminderKind, ReminderTask};
